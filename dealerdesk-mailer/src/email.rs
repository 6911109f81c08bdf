use crate::MailerError;
use lettre::Message;
use lettre::message::header::ContentType;
use serde::{Deserialize, Serialize};

/// A plain-text email ready to hand to a [`Mailer`](crate::Mailer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

impl Email {
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }

    pub fn validate(&self) -> Result<(), MailerError> {
        if self.to.is_empty() {
            return Err(MailerError::Builder(
                "At least one recipient is required".to_string(),
            ));
        }

        if self.from.is_empty() {
            return Err(MailerError::Builder("From address is required".to_string()));
        }

        if self.subject.is_empty() {
            return Err(MailerError::Builder("Subject is required".to_string()));
        }

        Ok(())
    }
}

impl TryFrom<Email> for Message {
    type Error = MailerError;

    fn try_from(email: Email) -> Result<Self, Self::Error> {
        let mut builder = Message::builder()
            .from(email.from.parse()?)
            .subject(email.subject)
            .header(ContentType::TEXT_PLAIN);

        for to in email.to {
            builder = builder.to(to.parse()?);
        }

        for cc in email.cc {
            builder = builder.cc(cc.parse()?);
        }

        if let Some(reply_to) = email.reply_to {
            builder = builder.reply_to(reply_to.parse()?);
        }

        Ok(builder.body(email.body)?)
    }
}

#[derive(Debug, Default)]
pub struct EmailBuilder {
    to: Vec<String>,
    cc: Vec<String>,
    from: Option<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    body: Option<String>,
}

impl EmailBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to<S: Into<String>>(mut self, email: S) -> Self {
        self.to.push(email.into());
        self
    }

    pub fn to_multiple<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.to.extend(emails.into_iter().map(Into::into));
        self
    }

    pub fn cc<S: Into<String>>(mut self, email: S) -> Self {
        self.cc.push(email.into());
        self
    }

    pub fn from<S: Into<String>>(mut self, email: S) -> Self {
        self.from = Some(email.into());
        self
    }

    pub fn reply_to<S: Into<String>>(mut self, email: S) -> Self {
        self.reply_to = Some(email.into());
        self
    }

    pub fn subject<S: Into<String>>(mut self, subject: S) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn text_body<S: Into<String>>(mut self, text: S) -> Self {
        self.body = Some(text.into());
        self
    }

    pub fn build(self) -> Result<Email, MailerError> {
        let email = Email {
            to: self.to,
            cc: self.cc,
            from: self
                .from
                .ok_or_else(|| MailerError::Builder("From address is required".to_string()))?,
            reply_to: self.reply_to,
            subject: self
                .subject
                .ok_or_else(|| MailerError::Builder("Subject is required".to_string()))?,
            body: self.body.unwrap_or_default(),
        };

        email.validate()?;
        Ok(email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_builder() {
        let email = Email::builder()
            .from("crm@example.com")
            .to_multiple(["sales@example.com", "ops@example.com"])
            .subject("Add Dealer Successful")
            .text_body("Successful!")
            .build()
            .unwrap();

        assert_eq!(email.from, "crm@example.com");
        assert_eq!(email.to, vec!["sales@example.com", "ops@example.com"]);
        assert_eq!(email.subject, "Add Dealer Successful");
        assert_eq!(email.body, "Successful!");
    }

    #[test]
    fn test_email_requires_recipient() {
        let result = Email::builder()
            .from("crm@example.com")
            .subject("Test")
            .build();

        assert!(matches!(result, Err(MailerError::Builder(_))));
    }

    #[test]
    fn test_message_conversion_rejects_bad_address() {
        let email = Email {
            to: vec!["not an address".to_string()],
            cc: vec![],
            from: "crm@example.com".to_string(),
            reply_to: None,
            subject: "Subject".to_string(),
            body: "Body".to_string(),
        };

        assert!(matches!(
            Message::try_from(email),
            Err(MailerError::Address(_))
        ));
    }

    #[test]
    fn test_message_conversion() {
        let email = Email::builder()
            .from("DealerDesk <crm@example.com>")
            .to("sales@example.com")
            .cc("audit@example.com")
            .subject("Subject")
            .text_body("Body")
            .build()
            .unwrap();

        assert!(Message::try_from(email).is_ok());
    }
}
