use std::fmt;

/// One output line of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub subject: String,
    pub message: String,
}

impl ResultRecord {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.subject, self.message)
    }
}
