use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NotificationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    RegistrationApproved,
    RegistrationRejected,
    LoanApproved,
    LoanRejected,
    DepositApproved,
    DepositRejected,
    #[serde(alias = "withdrawal-approved")]
    WithdrawApproved,
    #[serde(alias = "withdrawal-rejected")]
    WithdrawRejected,
    PaymentApproved,
    PaymentRejected,
    AdminAccountApproved,
    AdminAccountRejected,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 12] = [
        NotificationKind::RegistrationApproved,
        NotificationKind::RegistrationRejected,
        NotificationKind::LoanApproved,
        NotificationKind::LoanRejected,
        NotificationKind::DepositApproved,
        NotificationKind::DepositRejected,
        NotificationKind::WithdrawApproved,
        NotificationKind::WithdrawRejected,
        NotificationKind::PaymentApproved,
        NotificationKind::PaymentRejected,
        NotificationKind::AdminAccountApproved,
        NotificationKind::AdminAccountRejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::RegistrationApproved => "registration-approved",
            NotificationKind::RegistrationRejected => "registration-rejected",
            NotificationKind::LoanApproved => "loan-approved",
            NotificationKind::LoanRejected => "loan-rejected",
            NotificationKind::DepositApproved => "deposit-approved",
            NotificationKind::DepositRejected => "deposit-rejected",
            NotificationKind::WithdrawApproved => "withdraw-approved",
            NotificationKind::WithdrawRejected => "withdraw-rejected",
            NotificationKind::PaymentApproved => "payment-approved",
            NotificationKind::PaymentRejected => "payment-rejected",
            NotificationKind::AdminAccountApproved => "admin-account-approved",
            NotificationKind::AdminAccountRejected => "admin-account-rejected",
        }
    }

    pub fn is_approval(&self) -> bool {
        matches!(
            self,
            NotificationKind::RegistrationApproved
                | NotificationKind::LoanApproved
                | NotificationKind::DepositApproved
                | NotificationKind::WithdrawApproved
                | NotificationKind::PaymentApproved
                | NotificationKind::AdminAccountApproved
        )
    }
}

impl Display for NotificationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = match normalized.as_str() {
            "withdrawal-approved" => "withdraw-approved",
            "withdrawal-rejected" => "withdraw-rejected",
            other => other,
        };

        NotificationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                NotificationError::InvalidRequest(format!("Unknown notification kind '{}'", s))
            })
    }
}

/// A single notification to deliver. Built once through the `with_*`
/// methods and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    kind: NotificationKind,
    recipient: String,
    first_name: String,
    last_name: String,
    params: BTreeMap<String, Value>,
    copy_of: Option<String>,
}

impl NotificationRequest {
    pub fn new(kind: NotificationKind, recipient: impl Into<String>) -> Self {
        Self {
            kind,
            recipient: recipient.into(),
            first_name: String::new(),
            last_name: String::new(),
            params: BTreeMap::new(),
            copy_of: None,
        }
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = last_name.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_params<I, K>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Copy of this request addressed to the organization owner.
    pub fn owner_copy(&self, owner: impl Into<String>) -> Self {
        Self {
            recipient: owner.into(),
            copy_of: Some(self.recipient.clone()),
            ..self.clone()
        }
    }

    /// Original recipient when this request is an owner copy.
    pub fn copy_of(&self) -> Option<&str> {
        self.copy_of.as_deref()
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }
}
