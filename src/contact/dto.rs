use serde::{Deserialize, Serialize};

use crate::contact::repo_types::{ContactSubmission, NewContact};

/// Public contact form body.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub phone: Option<String>,
}

impl From<ContactForm> for NewContact {
    fn from(f: ContactForm) -> Self {
        Self {
            name: f.name,
            email: f.email.trim().to_string(),
            subject: f.subject,
            message: f.message,
            phone: f.phone,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactSubmitted {
    pub message: &'static str,
    pub submission_id: i64,
    pub status: &'static str,
}

/// One page of submissions, newest first. `total` counts every row.
#[derive(Debug, Serialize)]
pub struct ContactPage {
    pub submissions: Vec<ContactSubmission>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
