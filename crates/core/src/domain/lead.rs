use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeadId(pub Uuid);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LeadStatus {
    New,
    Contacted,
    Closed,
}

/// Contact request captured when a user accepts a recommendation. The
/// summary lines and total price come straight from the computed
/// `Recommendation`; the engine itself never touches this type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub comments: Option<String>,
    pub summary: Vec<String>,
    pub total_price: Decimal,
}

impl LeadSubmission {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidLead("name must not be blank".to_owned()));
        }
        if self.phone.trim().is_empty() && self.email.trim().is_empty() {
            return Err(DomainError::InvalidLead(
                "at least one contact channel (phone or email) is required".to_owned(),
            ));
        }
        if self.total_price < Decimal::ZERO {
            return Err(DomainError::InvalidLead("total price must not be negative".to_owned()));
        }
        Ok(())
    }

    /// Stable digest over the normalized contact fields, used by the lead
    /// sink to spot repeat submissions from the same person.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for field in [&self.name, &self.phone, &self.email] {
            hasher.update(field.trim().to_lowercase().as_bytes());
            hasher.update(b"\x1f");
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub created_at: DateTime<Utc>,
    pub status: LeadStatus,
    pub fingerprint: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub comments: Option<String>,
    pub summary: Vec<String>,
    pub total_price: Decimal,
}

impl Lead {
    pub fn from_submission(submission: LeadSubmission) -> Result<Self, DomainError> {
        submission.validate()?;
        let fingerprint = submission.fingerprint();
        Ok(Self {
            id: LeadId(Uuid::new_v4()),
            created_at: Utc::now(),
            status: LeadStatus::New,
            fingerprint,
            name: submission.name,
            phone: submission.phone,
            email: submission.email,
            address: submission.address,
            comments: submission.comments,
            summary: submission.summary,
            total_price: submission.total_price,
        })
    }

    pub fn can_transition_to(&self, next: LeadStatus) -> bool {
        matches!(
            (self.status, next),
            (LeadStatus::New, LeadStatus::Contacted)
                | (LeadStatus::New, LeadStatus::Closed)
                | (LeadStatus::Contacted, LeadStatus::Closed)
        )
    }

    pub fn transition_to(&mut self, next: LeadStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }
        Err(DomainError::InvalidLeadTransition { from: self.status, to: next })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Lead, LeadStatus, LeadSubmission};

    fn submission() -> LeadSubmission {
        LeadSubmission {
            name: "Anna M.".to_owned(),
            phone: "977353735".to_owned(),
            email: "anna@example.com".to_owned(),
            address: "L'Aldea".to_owned(),
            comments: None,
            summary: vec!["Fibra 300Mb + GB Il·limitats".to_owned()],
            total_price: Decimal::new(3290, 2),
        }
    }

    #[test]
    fn rejects_blank_name_and_missing_contact_channel() {
        let mut blank_name = submission();
        blank_name.name = "  ".to_owned();
        assert!(blank_name.validate().is_err());

        let mut no_contact = submission();
        no_contact.phone = String::new();
        no_contact.email = " ".to_owned();
        assert!(no_contact.validate().is_err());
    }

    #[test]
    fn fingerprint_ignores_case_and_whitespace() {
        let mut other = submission();
        other.name = "  ANNA M. ".to_owned();
        other.address = "Tortosa".to_owned();
        assert_eq!(submission().fingerprint(), other.fingerprint());

        let mut different = submission();
        different.email = "anna2@example.com".to_owned();
        assert_ne!(submission().fingerprint(), different.fingerprint());
    }

    #[test]
    fn lead_status_walks_forward_only() {
        let mut lead = Lead::from_submission(submission()).expect("lead");
        assert_eq!(lead.status, LeadStatus::New);

        lead.transition_to(LeadStatus::Contacted).expect("new -> contacted");
        lead.transition_to(LeadStatus::Closed).expect("contacted -> closed");
        let error = lead.transition_to(LeadStatus::New).expect_err("closed is terminal");
        assert!(matches!(error, crate::errors::DomainError::InvalidLeadTransition { .. }));
    }
}
