use crate::models::notification::NotificationKind;

/// Fixed wording for one notification kind. Bodies are Handlebars templates;
/// placeholders use `{{name}}`.
#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub kind: NotificationKind,
    pub subject: &'static str,
    pub body_text: &'static str,
    /// Inner HTML; the renderer wraps it in the shared layout.
    pub body_html: &'static str,
    pub required_fields: &'static [&'static str],
    /// Whether the organization owner also gets a copy.
    pub notify_owner: bool,
}

pub fn template_for(kind: NotificationKind) -> &'static Template {
    // TEMPLATES is ordered like NotificationKind::ALL
    &TEMPLATES[kind as usize]
}

pub const OWNER_COPY_SUBJECT_PREFIX: &str = "[Copy] ";

pub const OWNER_COPY_TEXT: &str = "This is a copy of the notification sent to {{fullName}} <{{recipient}}>.\n\n";

pub const OWNER_COPY_HTML: &str = "<p><em>This is a copy of the notification sent to {{fullName}} &lt;{{recipient}}&gt;.</em></p>";

pub const HTML_LAYOUT: &str = r#"<!DOCTYPE html>
<html>
  <body style="font-family: Arial, sans-serif; color: #222; line-height: 1.5;">
    <div style="max-width: 600px; margin: 0 auto; padding: 24px;">
      <h2 style="color: #1a5d1a;">{{subject}}</h2>
      {{{content}}}
      <p style="margin-top: 32px; font-size: 12px; color: #777;">This is an automated message. Please do not reply to this email.</p>
    </div>
  </body>
</html>"#;

pub static TEMPLATES: [Template; 12] = [
    Template {
        kind: NotificationKind::RegistrationApproved,
        subject: "Your Membership Registration Has Been Approved",
        body_text: "Dear {{fullName}},\n\n\
Congratulations! Your membership registration has been approved. \
You can now log in to the app to view your account, apply for loans, and make deposits.\n\n\
Thank you for joining our cooperative.",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Congratulations! Your membership registration has been <strong>approved</strong>. \
You can now log in to the app to view your account, apply for loans, and make deposits.</p>\
<p>Thank you for joining our cooperative.</p>",
        required_fields: &["firstName", "lastName"],
        notify_owner: true,
    },
    Template {
        kind: NotificationKind::RegistrationRejected,
        subject: "Your Membership Registration Has Been Rejected",
        body_text: "Dear {{fullName}},\n\n\
We regret to inform you that your membership registration has been rejected.\n\n\
Reason: {{reason}}\n\n\
If you have questions, please contact the cooperative office.",
        body_html: "<p>Dear {{fullName}},</p>\
<p>We regret to inform you that your membership registration has been <strong>rejected</strong>.</p>\
<p>Reason: {{reason}}</p>\
<p>If you have questions, please contact the cooperative office.</p>",
        required_fields: &["firstName", "lastName", "reason"],
        notify_owner: true,
    },
    Template {
        kind: NotificationKind::LoanApproved,
        subject: "Your Loan Application Has Been Approved",
        body_text: "Dear {{fullName}},\n\n\
Your {{loanType}} loan application has been approved.\n\n\
Amount: {{amount}}\n\
Term: {{term}}\n\
Reference: {{referenceNumber}}\n\n\
The proceeds will be released according to the cooperative's disbursement schedule.",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Your {{loanType}} loan application has been <strong>approved</strong>.</p>\
<ul><li>Amount: {{amount}}</li><li>Term: {{term}}</li><li>Reference: {{referenceNumber}}</li></ul>\
<p>The proceeds will be released according to the cooperative's disbursement schedule.</p>",
        required_fields: &["lastName", "amount"],
        notify_owner: true,
    },
    Template {
        kind: NotificationKind::LoanRejected,
        subject: "Your Loan Application Has Been Rejected",
        body_text: "Dear {{fullName}},\n\n\
We regret to inform you that your {{loanType}} loan application for {{amount}} has been rejected.\n\n\
Reason: {{reason}}\n\n\
You may submit a new application once the concerns above have been addressed.",
        body_html: "<p>Dear {{fullName}},</p>\
<p>We regret to inform you that your {{loanType}} loan application for {{amount}} has been <strong>rejected</strong>.</p>\
<p>Reason: {{reason}}</p>\
<p>You may submit a new application once the concerns above have been addressed.</p>",
        required_fields: &["lastName", "reason"],
        notify_owner: true,
    },
    Template {
        kind: NotificationKind::DepositApproved,
        subject: "Your Deposit Has Been Approved",
        body_text: "Dear {{fullName}},\n\n\
Your deposit of {{amount}} has been approved and credited to your account.\n\n\
Reference: {{referenceNumber}}\n\
Date: {{date}}",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Your deposit of <strong>{{amount}}</strong> has been approved and credited to your account.</p>\
<ul><li>Reference: {{referenceNumber}}</li><li>Date: {{date}}</li></ul>",
        required_fields: &["lastName", "amount"],
        notify_owner: false,
    },
    Template {
        kind: NotificationKind::DepositRejected,
        subject: "Your Deposit Has Been Rejected",
        body_text: "Dear {{fullName}},\n\n\
Your deposit of {{amount}} could not be approved.\n\n\
Reason: {{reason}}\n\n\
Please contact the cooperative office for assistance.",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Your deposit of <strong>{{amount}}</strong> could not be approved.</p>\
<p>Reason: {{reason}}</p>\
<p>Please contact the cooperative office for assistance.</p>",
        required_fields: &["lastName", "amount", "reason"],
        notify_owner: false,
    },
    Template {
        kind: NotificationKind::WithdrawApproved,
        subject: "Your Withdrawal Request Has Been Approved",
        body_text: "Dear {{fullName}},\n\n\
Your withdrawal request of {{amount}} has been approved.\n\n\
Reference: {{referenceNumber}}\n\
Date: {{date}}\n\n\
The funds will be released through your selected payout method.",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Your withdrawal request of <strong>{{amount}}</strong> has been approved.</p>\
<ul><li>Reference: {{referenceNumber}}</li><li>Date: {{date}}</li></ul>\
<p>The funds will be released through your selected payout method.</p>",
        required_fields: &["lastName", "amount"],
        notify_owner: false,
    },
    Template {
        kind: NotificationKind::WithdrawRejected,
        subject: "Your Withdrawal Request Has Been Rejected",
        body_text: "Dear {{fullName}},\n\n\
Your withdrawal request of {{amount}} has been rejected.\n\n\
Reason: {{reason}}\n\n\
Your balance has not been changed.",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Your withdrawal request of <strong>{{amount}}</strong> has been rejected.</p>\
<p>Reason: {{reason}}</p>\
<p>Your balance has not been changed.</p>",
        required_fields: &["lastName", "amount", "reason"],
        notify_owner: false,
    },
    Template {
        kind: NotificationKind::PaymentApproved,
        subject: "Your Loan Payment Has Been Approved",
        body_text: "Dear {{fullName}},\n\n\
Your payment of {{amount}} has been approved and applied to your loan.\n\n\
Reference: {{referenceNumber}}\n\
Remaining balance: {{balance}}",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Your payment of <strong>{{amount}}</strong> has been approved and applied to your loan.</p>\
<ul><li>Reference: {{referenceNumber}}</li><li>Remaining balance: {{balance}}</li></ul>",
        required_fields: &["lastName", "amount"],
        notify_owner: false,
    },
    Template {
        kind: NotificationKind::PaymentRejected,
        subject: "Your Loan Payment Has Been Rejected",
        body_text: "Dear {{fullName}},\n\n\
Your payment of {{amount}} could not be verified and has been rejected.\n\n\
Reason: {{reason}}\n\n\
Please resubmit your proof of payment or contact the cooperative office.",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Your payment of <strong>{{amount}}</strong> could not be verified and has been rejected.</p>\
<p>Reason: {{reason}}</p>\
<p>Please resubmit your proof of payment or contact the cooperative office.</p>",
        required_fields: &["lastName", "amount", "reason"],
        notify_owner: false,
    },
    Template {
        kind: NotificationKind::AdminAccountApproved,
        subject: "Your Admin Account Has Been Approved",
        body_text: "Dear {{fullName}},\n\n\
Your administrator account has been approved. You can now sign in to the admin dashboard.",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Your administrator account has been <strong>approved</strong>. You can now sign in to the admin dashboard.</p>",
        required_fields: &["firstName", "lastName"],
        notify_owner: false,
    },
    Template {
        kind: NotificationKind::AdminAccountRejected,
        subject: "Your Admin Account Request Has Been Rejected",
        body_text: "Dear {{fullName}},\n\n\
Your request for an administrator account has been rejected.\n\n\
Reason: {{reason}}",
        body_html: "<p>Dear {{fullName}},</p>\
<p>Your request for an administrator account has been <strong>rejected</strong>.</p>\
<p>Reason: {{reason}}</p>",
        required_fields: &["firstName", "lastName"],
        notify_owner: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_order_matches_kinds() {
        for kind in NotificationKind::ALL {
            assert_eq!(template_for(kind).kind, kind);
        }
    }
}
