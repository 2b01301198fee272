//! Turns a scan [`Outlook`] into the Slack digest.
//!
//! The digest has up to three attachments: who is on call now ("Vandaag"),
//! who takes over next ("Volgende"), and where the configured rotation ends
//! ("Einde rooster").

use oncall_core::{MemberResolver, MemberSet, Outlook, Schedule, Timestamp};

use crate::message::{Attachment, SlackMessage};
use crate::templating::{TemplateContext, TemplateRenderer};
use crate::traits::NotifyError;

/// Label shown when nobody holds duty.
pub const NOBODY: &str = "<<geen>>";

pub const DEFAULT_USERNAME_TEMPLATE: &str = "📞 Wachtdienst {{ group }}";
pub const DEFAULT_TEXT_TEMPLATE: &str =
    "Een overzicht van de huidige wachtdiensten die zijn ingeregeld voor {{ group }} in Nerve Centre";

const COLOR_ON_CALL: &str = "#007a5a";
const COLOR_NEXT: &str = "#ffc917";
const COLOR_ALERT: &str = "#ec0045";

const DATE_TIME: &str = "%d-%m-%Y %H:%M";
const DATE_AT_TIME: &str = "%d-%m-%Y om %H:%M";

/// Composes the outbound digest for one schedule.
#[derive(Debug)]
pub struct ReportComposer {
    renderer: TemplateRenderer,
    username_template: String,
    text_template: String,
}

impl ReportComposer {
    /// Composer with the default Dutch header templates.
    pub fn new() -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            username_template: DEFAULT_USERNAME_TEMPLATE.to_string(),
            text_template: DEFAULT_TEXT_TEMPLATE.to_string(),
        }
    }

    /// Composer with optional header template overrides.
    ///
    /// Overrides are syntax-checked up front so a broken template fails
    /// before any roster traffic happens.
    pub fn with_templates(
        username_template: Option<String>,
        text_template: Option<String>,
    ) -> Result<Self, NotifyError> {
        let mut composer = Self::new();
        if let Some(tmpl) = username_template {
            composer
                .renderer
                .validate(&tmpl)
                .map_err(|e| NotifyError::Config(format!("invalid username template: {e}")))?;
            composer.username_template = tmpl;
        }
        if let Some(tmpl) = text_template {
            composer
                .renderer
                .validate(&tmpl)
                .map_err(|e| NotifyError::Config(format!("invalid text template: {e}")))?;
            composer.text_template = tmpl;
        }
        Ok(composer)
    }

    pub fn compose(
        &self,
        outlook: &Outlook,
        schedule: &Schedule,
        resolver: &dyn MemberResolver,
        channel: Option<&str>,
        now: Timestamp,
    ) -> Result<SlackMessage, NotifyError> {
        let ctx = TemplateContext {
            group: schedule.group_name.clone(),
            now: now.format(DATE_TIME).to_string(),
        };

        let mut attachments = Vec::with_capacity(3);
        attachments.push(today_attachment(outlook, resolver));

        if let Some(next) = &outlook.next {
            let (text, color) = if next.members.is_empty() {
                (NOBODY.to_string(), COLOR_ALERT)
            } else {
                let mut text = names(&next.members, resolver);
                if let Some(start) = next.start {
                    text.push_str(&format!(" op {}", start.format(DATE_AT_TIME)));
                }
                (text, COLOR_NEXT)
            };
            attachments.push(Attachment {
                color: color.to_string(),
                fallback: format!("Volgende: {text}"),
                title: "Volgende".to_string(),
                text,
                ts: next.start.map(|t| t.timestamp()),
            });
        }

        // Without later planning the rotation ends with the current slot.
        let rotation_end = outlook.scan_end.or(outlook.current.end);
        if let (false, Some(end)) = (outlook.nobody_on_call(), rotation_end) {
            let text = format!("Er is een rooster tot {}", end.format(DATE_TIME));
            attachments.push(Attachment {
                color: COLOR_ALERT.to_string(),
                fallback: text.clone(),
                title: "Einde rooster".to_string(),
                text,
                ts: Some(end.timestamp()),
            });
        }

        Ok(SlackMessage {
            username: self.renderer.render(&self.username_template, &ctx)?,
            channel: channel.filter(|c| !c.is_empty()).map(str::to_string),
            text: self.renderer.render(&self.text_template, &ctx)?,
            attachments,
        })
    }
}

impl Default for ReportComposer {
    fn default() -> Self {
        Self::new()
    }
}

fn today_attachment(outlook: &Outlook, resolver: &dyn MemberResolver) -> Attachment {
    let (text, color) = if outlook.nobody_on_call() {
        (NOBODY.to_string(), COLOR_ALERT)
    } else {
        let mut text = names(&outlook.current.members, resolver);
        if let Some(end) = outlook.current.end {
            text.push_str(&format!(" tot {}", end.format(DATE_TIME)));
        }
        (text, COLOR_ON_CALL)
    };

    Attachment {
        color: color.to_string(),
        fallback: format!("Vandaag: {text}"),
        title: "Vandaag".to_string(),
        text,
        ts: None,
    }
}

fn names(members: &MemberSet, resolver: &dyn MemberResolver) -> String {
    resolver.display_names(members).join(", ")
}
