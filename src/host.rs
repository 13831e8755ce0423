//! Interfaces to the editor hosting the publisher.

use crate::ast::{Component, DataSource, Field, Page, Token};
use indexmap::IndexMap;
use serde::Serialize;

/// Notification group of page settings errors
pub const SETTINGS_ERRORS_GROUP: &str = "Errors in your settings";

/// Static type information about the data sources
pub trait DataTree {
    /// Result type of an expression evaluated in the context of `component`,
    /// `None` when it cannot be resolved
    fn expression_result_type(&self, expression: &[Token], component: &Component) -> Option<Field>;

    /// Every field a page can be generated from
    fn all_queryable_fields(&self) -> Vec<Field> {
        Vec::new()
    }
}

/// Data source registry
pub trait DataSources {
    fn data_source(&self, id: &str) -> Option<DataSource>;
}

/// Builds the query sent to each data source for a page
pub trait QueryAggregator {
    /// Query payload by data source id
    fn page_query(&self, page: &Page) -> IndexMap<String, String>;
}

/// Everything a publish pass needs from the host
pub trait Host: DataTree + DataSources + QueryAggregator {}

impl<T: DataTree + DataSources + QueryAggregator> Host for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Error => "error",
            NotificationKind::Warning => "warning",
            NotificationKind::Info => "info",
        }
    }
}

/// A message for the user of the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub group: String,
}

impl Notification {
    pub fn error(message: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
            group: group.into(),
        }
    }
}

pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// Keeps notifications for later display
#[derive(Debug, Clone, Default)]
pub struct CollectNotifier {
    pub notifications: Vec<Notification>,
}

impl CollectNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.notifications.iter().any(|n| n.kind == NotificationKind::Error)
    }
}

impl Notifier for CollectNotifier {
    fn notify(&mut self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => log::error!("[{}] {}", notification.group, notification.message),
            NotificationKind::Warning => log::warn!("[{}] {}", notification.group, notification.message),
            NotificationKind::Info => log::info!("[{}] {}", notification.group, notification.message),
        }
        self.notifications.push(notification);
    }
}
