//! Portal catalog.
//!
//! A portal is a named business-data category (subscriptions, tasks, ...).
//! Entering one makes it the active module of the chat session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ZionError;
use crate::types::DataSnapshot;

/// Identifier of a portal, also sent to the backends as the chat context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortalId {
    Dashboard,
    Subscriptions,
    Tasks,
    Analytics,
    Ai,
}

impl PortalId {
    pub const ALL: [PortalId; 5] = [
        PortalId::Dashboard,
        PortalId::Subscriptions,
        PortalId::Tasks,
        PortalId::Analytics,
        PortalId::Ai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PortalId::Dashboard => "dashboard",
            PortalId::Subscriptions => "subscriptions",
            PortalId::Tasks => "tasks",
            PortalId::Analytics => "analytics",
            PortalId::Ai => "ai",
        }
    }

    /// Static description of this portal.
    pub fn portal(&self) -> &'static Portal {
        match self {
            PortalId::Dashboard => &CATALOG[0],
            PortalId::Subscriptions => &CATALOG[1],
            PortalId::Tasks => &CATALOG[2],
            PortalId::Analytics => &CATALOG[3],
            PortalId::Ai => &CATALOG[4],
        }
    }
}

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortalId {
    type Err = ZionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PortalId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| ZionError::Config(format!("unknown portal '{}'", s.trim())))
    }
}

/// Display metadata of a portal.
#[derive(Debug)]
pub struct Portal {
    pub id: PortalId,
    pub name: &'static str,
    pub realm: &'static str,
    pub description: &'static str,
    pub actions: &'static [&'static str],
    insights: &'static [&'static str],
}

static CATALOG: [Portal; 5] = [
    Portal {
        id: PortalId::Dashboard,
        name: "Command Center",
        realm: "Control Matrix",
        description: "Central hub for all your daily operations",
        actions: &["System Overview", "Configuration", "Diagnostics", "Logs"],
        insights: &["5 systems online", "All green"],
    },
    Portal {
        id: PortalId::Subscriptions,
        name: "Subscription Hub",
        realm: "Financial Dimension",
        description: "Monitor and manage all your recurring subscriptions",
        actions: &["View All", "Add New", "Analytics", "Export"],
        insights: &["$247/mo total", "8 active"],
    },
    Portal {
        id: PortalId::Tasks,
        name: "Task Nexus",
        realm: "Productivity Sphere",
        description: "Create and track your personal and professional tasks",
        actions: &["Create Task", "View Timeline", "Set Priorities", "Archive"],
        insights: &["12 pending", "3 due today"],
    },
    Portal {
        id: PortalId::Analytics,
        name: "Analytics Portal",
        realm: "Data Dimension",
        description: "Visualize your performance metrics and insights",
        actions: &["View Reports", "Custom Charts", "Export Data", "Predictions"],
        insights: &["+23% growth", "5 insights"],
    },
    Portal {
        id: PortalId::Ai,
        name: "AI Consciousness",
        realm: "Neural Network",
        description: "Interact with your personal AI assistant",
        actions: &["Train Model", "View Insights", "Adjust Parameters", "Chat"],
        insights: &["Learning active", "Ready"],
    },
];

/// All portals in display order.
pub fn catalog() -> &'static [Portal] {
    &CATALOG
}

impl Portal {
    /// Headline figures for the portal.
    ///
    /// The subscriptions portal reports live numbers once data has arrived.
    pub fn insights(&self, data: &DataSnapshot) -> Vec<String> {
        if self.id == PortalId::Subscriptions && !data.subscriptions.is_empty() {
            return vec![
                format!("${}/mo total", data.monthly_cost().rounded_units()),
                format!("{} active", data.subscriptions.len()),
            ];
        }
        self.insights.iter().map(|s| s.to_string()).collect()
    }

    /// The assistant notice shown when the user enters this portal.
    pub fn arrival_message(&self, data: &DataSnapshot) -> String {
        match self.id {
            PortalId::Dashboard => {
                format!("Command Center accessed. {}.", self.insights(data).join(", "))
            }
            PortalId::Subscriptions => format!(
                "Financial dimension unlocked. Monitoring {} active subscriptions totaling ${}/month.",
                data.subscriptions.len(),
                data.monthly_cost()
            ),
            PortalId::Tasks => {
                "Productivity nexus online. Your task management dimension awaits commands."
                    .to_string()
            }
            PortalId::Analytics => {
                "Data streams converging. Analytics portal displaying dimensional insights."
                    .to_string()
            }
            PortalId::Ai => {
                "Neural consciousness bridge established. AI substrate ready for deep interaction."
                    .to_string()
            }
        }
    }

    /// The chat utterance for one of this portal's actions.
    pub fn action_utterance(&self, action: &str) -> String {
        format!("{} for {}", action.trim(), self.name)
    }
}
