//! Static navigation: the runtime's web inspectors and the command menu.
//!
//! A running JaCaMo application serves one inspector per dimension on a
//! fixed loopback port. The menu lists every command masdev offers, in the
//! order they are presented.

use std::fmt;
use std::str::FromStr;

/// One of the three inspector views a running application serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionView {
    Organisation,
    Agent,
    Environment,
}

impl DimensionView {
    pub const ALL: [DimensionView; 3] = [Self::Organisation, Self::Agent, Self::Environment];

    /// Loopback port the inspector listens on.
    pub fn port(self) -> u16 {
        match self {
            Self::Organisation => 3271,
            Self::Agent => 3272,
            Self::Environment => 3273,
        }
    }

    pub fn url(self) -> String {
        format!("http://localhost:{}/", self.port())
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Organisation => "Organization Dimension View",
            Self::Agent => "Agent Dimension View",
            Self::Environment => "Environment Dimension View",
        }
    }

    /// Short name used on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Self::Organisation => "org",
            Self::Agent => "agent",
            Self::Environment => "env",
        }
    }
}

impl fmt::Display for DimensionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DimensionView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "org" | "organisation" | "organization" => Ok(Self::Organisation),
            "agent" | "agents" => Ok(Self::Agent),
            "env" | "environment" => Ok(Self::Environment),
            other => Err(format!(
                "unknown view {other:?} (expected \"org\", \"agent\" or \"env\")"
            )),
        }
    }
}

/// Something that can open a URL for the user.
pub trait UrlOpener {
    fn open(&self, url: &str) -> std::io::Result<()>;
}

/// Open the inspector for `view` through `opener`, returning the URL opened.
pub fn open_view(view: DimensionView, opener: &dyn UrlOpener) -> std::io::Result<String> {
    let url = view.url();
    tracing::info!(view = %view, url = %url, "opening inspector");
    opener.open(&url)?;
    Ok(url)
}

/// The command a menu entry triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    CreateApp,
    RunApp,
    OpenView(DimensionView),
    StopMas,
}

impl MenuCommand {
    /// The CLI invocation equivalent to this entry.
    pub fn invocation(self) -> String {
        match self {
            Self::CreateApp => "masdev create".to_string(),
            Self::RunApp => "masdev run".to_string(),
            Self::OpenView(view) => format!("masdev open {}", view.key()),
            Self::StopMas => "masdev stop".to_string(),
        }
    }
}

/// One entry of the command menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub command: MenuCommand,
}

/// The command menu, in display order.
pub fn menu_entries() -> Vec<MenuEntry> {
    let mut entries = vec![
        MenuEntry {
            label: "Create JaCaMo App",
            command: MenuCommand::CreateApp,
        },
        MenuEntry {
            label: "Run JaCaMo App",
            command: MenuCommand::RunApp,
        },
    ];
    entries.extend(DimensionView::ALL.into_iter().map(|view| MenuEntry {
        label: view.label(),
        command: MenuCommand::OpenView(view),
    }));
    entries.push(MenuEntry {
        label: "Stop MAS Execution",
        command: MenuCommand::StopMas,
    });
    entries
}
