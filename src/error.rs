use crate::ast::Token;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Kind of expression compile error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptyExpression,
    LeadingFilter,
    MisplacedState,
    PropertyAfterFilter,
    NotAList,
    InvalidExpression,
    MissingPersistentId,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptyExpression => "Empty expression",
            ErrorKind::LeadingFilter => "Leading filter",
            ErrorKind::MisplacedState => "Misplaced state",
            ErrorKind::PropertyAfterFilter => "Property after filter",
            ErrorKind::NotAList => "Not a list",
            ErrorKind::InvalidExpression => "Invalid expression",
            ErrorKind::MissingPersistentId => "Missing persistent id",
        }
    }
}

/// Error while compiling an expression to Liquid
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionError {
    pub kind: ErrorKind,
    pub message: String,
    /// Token labels of the offending expression
    pub expression: Option<String>,
    pub help: Option<String>,
}

impl ExpressionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            expression: None,
            help: None,
        }
    }

    /// Attach the offending expression, shown as `a -> b -> c`
    pub fn with_expression(mut self, tokens: &[Token]) -> Self {
        let labels: Vec<&str> = tokens.iter().map(Token::label).collect();
        self.expression = Some(labels.join(" -> "));
        self
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error for a terminal, `context` names where it happened
    pub fn render(&self, context: &str) -> String {
        self.render_inner(context, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, context: &str) -> String {
        self.render_inner(context, true)
    }

    fn render_inner(&self, context: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');
        if !context.is_empty() {
            output.push_str(&format!(" {}in:{} {}\n", dim, reset, context));
        }
        output.push_str(&format!("{}error:{} {}: {}\n", red, reset, self.kind.as_str(), self.message));

        if let Some(ref expression) = self.expression {
            output.push_str(&format!("{}   |{}\n", dim, reset));
            output.push_str(&format!("{}   |{} {}\n", dim, reset, expression));
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            for (i, help_line) in help.lines().enumerate() {
                if i == 0 {
                    output.push_str(&format!(" {}help:{} {}\n", cyan, reset, help_line));
                } else {
                    output.push_str(&format!("       {}\n", help_line));
                }
            }
        }

        output.push('\n');
        output
    }
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExpressionError {}

/// Error during a publish pass
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{0}")]
    Expression(#[from] ExpressionError),

    #[error("Component {0} has dynamic content but no tag name")]
    MissingTagName(String),

    #[error("Could not find page {0}")]
    MissingPageFile(String),

    #[error("File {0} is not an HTML file")]
    NotHtml(String),

    #[error("Data source {0} not found")]
    UnknownDataSource(String),

    #[error("Invalid JSON for {name}: {reason}")]
    InvalidSettings { name: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PublishError {
    /// Errors caused by one page's bindings or settings; the pass goes on without that page
    pub fn is_page_local(&self) -> bool {
        matches!(
            self,
            PublishError::Expression(_) | PublishError::MissingTagName(_) | PublishError::InvalidSettings { .. }
        )
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PublishError::Io { path: path.into(), source }
    }

    /// Render for a terminal, with the expression context when there is one
    pub fn render(&self, context: &str, color: bool) -> String {
        match self {
            PublishError::Expression(err) if color => err.render_color(context),
            PublishError::Expression(err) => err.render(context),
            other if color => format!("\x1b[1;31merror:\x1b[0m \x1b[1m{}\x1b[0m\n", other),
            other => format!("error: {}\n", other),
        }
    }
}
