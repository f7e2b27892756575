//! Email delivery.
//!
//! Messages are built as multipart plain+html and sent through the
//! configured SMTP relay. The daily idea message is awaited by the caller
//! so delivery failures surface in the digest's per-subscriber accounting;
//! the welcome message is fire-and-forget.

use async_trait::async_trait;
use lettre::{
    address::AddressError,
    message::{MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{Error, ErrorKind, Idea, Result};

pub async fn send_async(message: Message, config: crate::config::Email) -> Result<()> {
    let creds = Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());

    // Open a remote connection to mail server
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
        .map_err(|e| Error::new(ErrorKind::Other(e.to_string())))?
        .port(config.smtp_port)
        .credentials(creds)
        .build();

    // Send the email
    let response = mailer.send(message).await?;
    if response.is_positive() {
        Ok(())
    } else {
        Err(ErrorKind::EmailBadResponse(response.code().to_string()).into())
    }
}

/// Seam between the digest/handlers and the concrete delivery backend.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_daily_idea(&self, to: &str, name: &str, idea: &Idea) -> Result<()>;
    async fn send_welcome(&self, to: &str, name: &str) -> Result<()>;
}

/// Production mailer sending through the configured SMTP relay.
#[derive(Clone, Debug)]
pub struct Smtp {
    config: crate::Config,
}

impl Smtp {
    pub fn new(config: crate::Config) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for Smtp {
    async fn send_daily_idea(&self, to: &str, name: &str, idea: &Idea) -> Result<()> {
        let message = daily_idea_message(to, name, idea, &self.config)?;
        send_async(message, self.config.email.clone()).await
    }

    async fn send_welcome(&self, to: &str, name: &str) -> Result<()> {
        welcome(to.to_string(), name.to_string(), &self.config)
    }
}

/// Builds the daily idea message for one subscriber.
pub fn daily_idea_message(
    to: &str,
    name: &str,
    idea: &Idea,
    config: &crate::Config,
) -> Result<Message> {
    let subject = format!("Today's Idea: {}", idea.title);

    let message = Message::builder()
        .from(
            format!("{} <{}>", config.name, config.email.address)
                .parse()
                .map_err(|e: AddressError| Error::new(ErrorKind::EmailParseError(e.to_string())))?,
        )
        .reply_to(
            format!("noreply <noreply@{}>", config.domain)
                .parse()
                .map_err(|e: AddressError| Error::new(ErrorKind::EmailParseError(e.to_string())))?,
        )
        .to(to
            .parse()
            .map_err(|e: AddressError| Error::new(ErrorKind::EmailParseError(e.to_string())))?)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(daily_idea_plain(name, idea, config)))
                .singlepart(SinglePart::html(daily_idea_html(idea, config))),
        )?;

    Ok(message)
}

fn daily_idea_plain(name: &str, idea: &Idea, config: &crate::Config) -> String {
    let mut body = format!(
        "Hey {name},\n\nYour daily content idea is ready.\n\n\
{platform} - {format} - {difficulty}\n\n\
{title}\n\nHook: \"{hook}\"\n\nTalking points:\n",
        name = name,
        platform = idea.platform,
        format = idea.format,
        difficulty = idea.difficulty.label(),
        title = idea.title,
        hook = idea.hook,
    );
    for point in &idea.talking_points {
        body.push_str(&format!("- {}\n", point));
    }
    body.push_str(&format!("\nCall to action: {}\n", idea.cta));
    body.push_str(&format!("\nHashtags: {}\n", idea.hashtags.join("  ")));
    if let Some(trend) = &idea.trend_connection {
        body.push_str(&format!("\nTrend connection: {}\n", trend));
    }
    body.push_str(&format!(
        "\nView it in your dashboard: https://{}/dashboard\n",
        config.domain
    ));
    if !config.company.name.is_empty() {
        body.push_str(&format!(
            "\n{}, {}\n",
            config.company.name, config.company.country
        ));
    }
    body
}

fn daily_idea_html(idea: &Idea, config: &crate::Config) -> String {
    let diff_color = idea.difficulty.color();

    let company = if config.company.name.is_empty() {
        String::new()
    } else {
        format!("<p>{}, {}</p>", config.company.name, config.company.country)
    };

    let talking_points = idea
        .talking_points
        .iter()
        .map(|p| {
            format!(
                "<div style=\"padding:8px 0;color:#B8BCC8;font-size:15px;line-height:1.5;\">\
<span style=\"color:#6C3CE1;margin-right:8px;\">&rarr;</span>{}</div>",
                p
            )
        })
        .collect::<String>();

    let trend = idea
        .trend_connection
        .as_ref()
        .map(|t| {
            format!(
                "<div style=\"margin-top:20px;padding:12px;background:rgba(255,255,255,0.03);border-radius:8px;\">\
<div style=\"font-size:11px;text-transform:uppercase;letter-spacing:1.5px;color:#FF6B35;font-weight:700;margin-bottom:6px;\">Trend Connection</div>\
<p style=\"color:#8892A0;font-size:14px;margin:0;\">{}</p></div>",
                t
            )
        })
        .unwrap_or_default();

    format!(
        "<!DOCTYPE html>
<html>
<head><meta charset=\"utf-8\"></head>
<body style=\"margin:0;padding:0;background:#0F0F1A;font-family:Arial,Helvetica,sans-serif;\">
  <div style=\"max-width:600px;margin:0 auto;padding:40px 20px;\">
    <div style=\"text-align:center;margin-bottom:32px;\">
      <h1 style=\"margin:0;font-size:24px;color:#6C3CE1;\">{name}</h1>
      <p style=\"color:#8892A0;font-size:14px;margin-top:4px;\">Your daily content idea is ready</p>
    </div>
    <div style=\"background:#1A1A2E;border:1px solid rgba(108,60,225,0.2);border-radius:16px;padding:32px;\">
      <div style=\"margin-bottom:16px;\">
        <span style=\"background:rgba(108,60,225,0.15);color:#6C3CE1;padding:6px 14px;border-radius:8px;font-size:13px;font-weight:600;\">{platform} &middot; {format}</span>
        <span style=\"background:{diff_color}20;color:{diff_color};padding:6px 14px;border-radius:8px;font-size:13px;font-weight:600;margin-left:8px;\">{difficulty}</span>
      </div>
      <h2 style=\"color:#FFFFFF;font-size:22px;margin:16px 0;line-height:1.4;\">{title}</h2>
      <div style=\"background:rgba(255,107,53,0.08);border-left:3px solid #FF6B35;padding:16px;border-radius:0 8px 8px 0;margin:20px 0;\">
        <div style=\"font-size:11px;text-transform:uppercase;letter-spacing:1.5px;color:#FF6B35;font-weight:700;margin-bottom:6px;\">Opening Hook</div>
        <p style=\"color:#FFB088;font-style:italic;font-size:16px;margin:0;line-height:1.5;\">&quot;{hook}&quot;</p>
      </div>
      <div style=\"margin:20px 0;\">
        <div style=\"font-size:11px;text-transform:uppercase;letter-spacing:1.5px;color:#6C3CE1;font-weight:700;margin-bottom:12px;\">Talking Points</div>
        {talking_points}
      </div>
      <div style=\"background:rgba(74,222,128,0.08);border-left:3px solid #4ADE80;padding:14px;border-radius:0 8px 8px 0;margin:20px 0;\">
        <div style=\"font-size:11px;text-transform:uppercase;letter-spacing:1.5px;color:#4ADE80;font-weight:700;margin-bottom:6px;\">Call to Action</div>
        <p style=\"color:#4ADE80;font-size:15px;margin:0;\">{cta}</p>
      </div>
      <div style=\"margin-top:20px;\">
        <div style=\"font-size:11px;text-transform:uppercase;letter-spacing:1.5px;color:#6C3CE1;font-weight:700;margin-bottom:10px;\">Hashtags</div>
        <p style=\"color:#8892A0;font-size:14px;margin:0;\">{hashtags}</p>
      </div>
      {trend}
    </div>
    <div style=\"text-align:center;margin-top:24px;\">
      <a href=\"https://{domain}/dashboard\" style=\"display:inline-block;background:#6C3CE1;color:#FFFFFF;padding:14px 32px;border-radius:10px;text-decoration:none;font-weight:700;font-size:15px;\">View in Dashboard</a>
    </div>
    <div style=\"text-align:center;margin-top:32px;color:#8892A0;font-size:12px;\">
      <p>You're receiving this because you signed up for {name}.</p>
      <p><a href=\"https://{domain}/settings\" style=\"color:#6C3CE1;text-decoration:none;\">Manage preferences</a> &middot; <a href=\"https://{domain}/unsubscribe\" style=\"color:#6C3CE1;text-decoration:none;\">Unsubscribe</a></p>
      {company}
    </div>
  </div>
</body>
</html>",
        name = config.name,
        domain = config.domain,
        platform = idea.platform,
        format = idea.format,
        difficulty = idea.difficulty.label(),
        diff_color = diff_color,
        title = idea.title,
        hook = idea.hook,
        talking_points = talking_points,
        cta = idea.cta,
        hashtags = idea.hashtags.join("  "),
        trend = trend,
        company = company,
    )
}

/// Sends the welcome message after a creator finishes setting up their
/// profile. Delivery happens in the background; failures are only logged.
pub fn welcome(email_addr: String, name: String, config: &crate::Config) -> Result<()> {
    let (subject, plain_body, html_body) = config
        .email
        .welcome
        .clone()
        .map(|(s, plain, html)| {
            (
                s,
                plain.replace("{name}", &name),
                html.replace("{name}", &name),
            )
        })
        .unwrap_or((
            format!(
                "Welcome to {} - your first idea is on the way!",
                config.name
            ),
            format!(
                "Hey {},\n\n\
You're all set! Starting tomorrow morning, you'll receive a personalized\n\
content idea in your inbox every day.\n\n\
Each idea comes with a scroll-stopping hook, talking points, a\n\
platform-specific format, trending hashtags and a call to action.\n\n\
Head to https://{}/profile to complete your creator profile so we can\n\
personalize your ideas.\n\n\
Let's create something amazing,\n\
The {} Team\n",
                name, config.domain, config.name
            ),
            format!(
                "<html><body style=\"background:#0F0F1A;font-family:Arial,Helvetica,sans-serif;\">\
<div style=\"max-width:600px;margin:0 auto;padding:40px 20px;\">\
<h1 style=\"text-align:center;font-size:24px;color:#6C3CE1;\">Welcome to {name}!</h1>\
<div style=\"background:#1A1A2E;border-radius:16px;padding:32px;color:#B8BCC8;font-size:15px;line-height:1.7;\">\
<p>Hey {user},</p>\
<p>You're all set! Starting tomorrow morning, you'll receive a personalized content idea in your inbox every day.</p>\
<p style=\"color:#6C3CE1;\">&rarr; A scroll-stopping hook<br>&rarr; Talking points<br>&rarr; Platform-specific format<br>&rarr; Trending hashtags<br>&rarr; A call to action</p>\
<div style=\"text-align:center;margin:24px 0;\">\
<a href=\"https://{domain}/profile\" style=\"display:inline-block;background:#6C3CE1;color:#FFFFFF;padding:14px 32px;border-radius:10px;text-decoration:none;font-weight:700;\">Set Up My Profile</a>\
</div>\
<p>Let's create something amazing,<br>The {name} Team</p>\
</div></div></body></html>",
                name = config.name,
                user = name,
                domain = config.domain,
            ),
        ));

    let message = Message::builder()
        .from(
            format!("{} <{}>", config.name, config.email.address)
                .parse()
                .map_err(|e: AddressError| Error::new(ErrorKind::EmailParseError(e.to_string())))?,
        )
        .reply_to(
            format!("noreply <noreply@{}>", config.domain)
                .parse()
                .map_err(|e: AddressError| Error::new(ErrorKind::EmailParseError(e.to_string())))?,
        )
        .to(email_addr
            .parse()
            .map_err(|e: AddressError| Error::new(ErrorKind::EmailParseError(e.to_string())))?)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(SinglePart::plain(plain_body))
                .singlepart(SinglePart::html(html_body)),
        )?;

    let email_config = config.email.clone();
    tokio::spawn(async move {
        if let Err(e) = send_async(message, email_config).await {
            log::error!("{e}")
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::IdeaDraft;
    use crate::idea::Difficulty;
    use uuid::Uuid;

    fn idea() -> Idea {
        Idea::from_draft(
            Uuid::new_v4(),
            IdeaDraft {
                title: "Morning routine myth-busting".to_string(),
                hook: "You've been lied to about 5am starts".to_string(),
                talking_points: vec!["point one".to_string(), "point two".to_string()],
                platform: "TikTok".to_string(),
                format: "60-second video".to_string(),
                hashtags: vec!["#fitness".to_string()],
                cta: "Follow for more".to_string(),
                difficulty: Difficulty::MediumEffort,
                trend_connection: Some("new year resolutions".to_string()),
            },
            true,
        )
    }

    #[test]
    fn daily_message_builds() {
        let config = crate::Config::default();
        let message = daily_idea_message("creator@example.com", "Sam", &idea(), &config).unwrap();
        let formatted = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(formatted.contains("Morning routine myth-busting"));
    }

    #[test]
    fn bodies_carry_idea_content() {
        let config = crate::Config::default();
        let idea = idea();
        let plain = daily_idea_plain("Sam", &idea, &config);
        assert!(plain.contains("Hey Sam"));
        assert!(plain.contains("point one"));
        assert!(plain.contains("Trend connection: new year resolutions"));

        let html = daily_idea_html(&idea, &config);
        assert!(html.contains("Medium Effort"));
        assert!(html.contains("#60A5FA"));
        assert!(html.contains("point two"));
    }

    #[test]
    fn company_footer_only_when_configured() {
        let mut config = crate::Config::default();
        let idea = idea();
        assert!(!daily_idea_html(&idea, &config).contains("<p>, "));

        config.company.name = "ContentAI Labs".to_string();
        config.company.country = "Estonia".to_string();
        assert!(daily_idea_html(&idea, &config).contains("ContentAI Labs, Estonia"));
        assert!(daily_idea_plain("Sam", &idea, &config).contains("ContentAI Labs, Estonia"));
    }
}
