//! Versioned contextual message generator.
//!
//! Only `v1` exists. Requests naming any other version are served by v1 and
//! the requested version is echoed back, so callers can start sending a new
//! version before the server knows about it.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use ob_domain::config::MessagingConfig;
use ob_domain::error::FieldError;
use ob_domain::trace::TraceEvent;
use ob_domain::{ChatRole, TimeOfDay, Validate};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::phrases;
use crate::trigger::{mood_bucket, MessageContext, Trigger};

pub const DEFAULT_VERSION: &str = "v1";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / response envelope
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualMessageRequest {
    pub trigger: Trigger,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<MessageContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ContextualMessageRequest {
    pub fn new(trigger: Trigger, context: Option<MessageContext>) -> Self {
        Self {
            trigger,
            context,
            version: None,
        }
    }
}

impl Validate for ContextualMessageRequest {
    fn validate(&self) -> Vec<FieldError> {
        match self.version.as_deref() {
            Some(v) if v.trim().is_empty() => {
                vec![FieldError::new("version", "must not be empty")]
            }
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextualMessageResponse {
    pub version: String,
    pub chat_message: ChatMessagePayload,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessagePayload {
    pub content: String,
    pub role: ChatRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub trigger: Trigger,
    pub timestamp: DateTime<Utc>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Generator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone)]
pub struct MessageGenerator {
    default_tz: Tz,
}

impl Default for MessageGenerator {
    fn default() -> Self {
        Self {
            default_tz: chrono_tz::UTC,
        }
    }
}

impl MessageGenerator {
    pub fn from_config(config: &MessagingConfig) -> Self {
        let default_tz = config.default_timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(
                timezone = %config.default_timezone,
                "unknown default timezone, using UTC"
            );
            chrono_tz::UTC
        });
        Self { default_tz }
    }

    /// Serve a request end to end with the thread RNG and the wall clock.
    pub fn handle(&self, req: &ContextualMessageRequest) -> ContextualMessageResponse {
        self.handle_with(req, Utc::now(), &mut rand::rng())
    }

    pub fn handle_with<R: Rng + ?Sized>(
        &self,
        req: &ContextualMessageRequest,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> ContextualMessageResponse {
        let version = req
            .version
            .clone()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string());
        if version != DEFAULT_VERSION {
            tracing::debug!(requested = %version, "unknown message version, serving v1");
        }

        let empty = MessageContext::default();
        let ctx = req.context.as_ref().unwrap_or(&empty);
        let content = self.generate_with(req.trigger, ctx, now, rng);

        TraceEvent::ContextualMessage {
            trigger: req.trigger.to_string(),
            version: version.clone(),
            chars: content.chars().count(),
        }
        .emit();

        ContextualMessageResponse {
            version,
            chat_message: ChatMessagePayload {
                content,
                role: ChatRole::Assistant,
            },
            metadata: ResponseMetadata {
                trigger: req.trigger,
                timestamp: now,
            },
        }
    }

    /// Produce the message text for a trigger. Never empty.
    pub fn generate(&self, trigger: Trigger, ctx: &MessageContext) -> String {
        self.generate_with(trigger, ctx, Utc::now(), &mut rand::rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        trigger: Trigger,
        ctx: &MessageContext,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> String {
        let nudge = pick(phrases::NUDGES, rng);
        match trigger {
            Trigger::ModeChange => match ctx.mode {
                Some(mode) => format!("Switching to {mode} mode. {nudge}"),
                None => format!("{}{nudge}", phrases::MODE_CHANGE_WITHOUT_MODE),
            },
            Trigger::ReflectionLogged => {
                let bucket = mood_bucket(ctx.mood.as_deref());
                format!("{} {nudge}", phrases::reflection_response(bucket))
            }
            Trigger::EnergyLow => format!("{} {nudge}", pick(phrases::LOW_ENERGY, rng)),
            Trigger::NoTask => pick(phrases::NO_TASK, rng).to_string(),
            Trigger::ChatOpened => {
                let time_of_day = ctx
                    .time_of_day
                    .unwrap_or_else(|| self.time_of_day_at(now, ctx.timezone.as_deref()));
                let mut parts = vec![phrases::time_greeting(time_of_day)];
                if let Some(mode) = ctx.mode {
                    parts.push(phrases::mode_greeting(mode));
                }
                parts.push(nudge);
                parts.join(" ")
            }
        }
    }

    /// Time of day at `now` in the named timezone, or the default timezone
    /// when the name is missing or unknown.
    pub fn time_of_day_at(&self, now: DateTime<Utc>, timezone: Option<&str>) -> TimeOfDay {
        let tz = timezone
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(self.default_tz);
        TimeOfDay::from_hour(now.with_timezone(&tz).hour())
    }
}

fn pick<'a, R: Rng + ?Sized>(bank: &[&'a str], rng: &mut R) -> &'a str {
    bank.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ob_domain::Mode;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn at_utc_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, hour, 30, 0).unwrap()
    }

    #[test]
    fn every_trigger_yields_text() {
        let g = MessageGenerator::default();
        for trigger in Trigger::ALL {
            let text = g.generate(trigger, &MessageContext::default());
            assert!(!text.trim().is_empty(), "{trigger} produced empty text");
        }
    }

    #[test]
    fn mode_change_names_the_mode() {
        let g = MessageGenerator::default();
        let text = g.generate(Trigger::ModeChange, &MessageContext::with_mode(Mode::Build));
        assert!(text.starts_with("Switching to build mode. "));
        assert!(text.contains("build"));
    }

    #[test]
    fn mode_change_without_mode() {
        let g = MessageGenerator::default();
        let text = g.generate(Trigger::ModeChange, &MessageContext::default());
        assert!(text.starts_with("Switching modes. "));
    }

    #[test]
    fn chat_opened_uses_context_time_of_day() {
        let g = MessageGenerator::default();
        let ctx = MessageContext::with_time_of_day(TimeOfDay::Morning);
        let text = g.generate_with(Trigger::ChatOpened, &ctx, at_utc_hour(22), &mut rng());
        assert!(text.contains("morning"));
    }

    #[test]
    fn chat_opened_derives_time_of_day_from_clock() {
        let g = MessageGenerator::default();
        let text = g.generate_with(
            Trigger::ChatOpened,
            &MessageContext::default(),
            at_utc_hour(14),
            &mut rng(),
        );
        assert!(text.starts_with("Good afternoon!"));
    }

    #[test]
    fn chat_opened_honours_timezone() {
        let g = MessageGenerator::default();
        // 14:30 UTC is 23:30 in Tokyo.
        let ctx = MessageContext {
            timezone: Some("Asia/Tokyo".into()),
            ..Default::default()
        };
        let text = g.generate_with(Trigger::ChatOpened, &ctx, at_utc_hour(14), &mut rng());
        assert!(text.contains("night"));

        let bad = MessageContext {
            timezone: Some("Mars/Olympus".into()),
            ..Default::default()
        };
        let text = g.generate_with(Trigger::ChatOpened, &bad, at_utc_hour(14), &mut rng());
        assert!(text.starts_with("Good afternoon!"));
    }

    #[test]
    fn chat_opened_includes_mode_greeting() {
        let g = MessageGenerator::default();
        let ctx = MessageContext {
            mode: Some(Mode::Restore),
            time_of_day: Some(TimeOfDay::Evening),
            ..Default::default()
        };
        let text = g.generate_with(Trigger::ChatOpened, &ctx, at_utc_hour(9), &mut rng());
        assert!(text.starts_with("Good evening! Restore mode is on"));
    }

    #[test]
    fn energy_low_mentions_energy_without_context() {
        let g = MessageGenerator::default();
        for seed in 0..20 {
            let text = g.generate_with(
                Trigger::EnergyLow,
                &MessageContext::default(),
                at_utc_hour(10),
                &mut StdRng::seed_from_u64(seed),
            );
            assert!(text.to_lowercase().contains("energy"));
        }
    }

    #[test]
    fn no_task_mentions_task() {
        let g = MessageGenerator::default();
        for seed in 0..20 {
            let text = g.generate_with(
                Trigger::NoTask,
                &MessageContext::default(),
                at_utc_hour(10),
                &mut StdRng::seed_from_u64(seed),
            );
            assert!(text.to_lowercase().contains("task"));
        }
    }

    #[test]
    fn reflection_picks_bucket_phrase() {
        let g = MessageGenerator::default();
        let happy = g.generate(Trigger::ReflectionLogged, &MessageContext::with_mood("great"));
        assert!(happy.starts_with(phrases::reflection_response(ob_domain::Valence::Positive)));
        let sad = g.generate(Trigger::ReflectionLogged, &MessageContext::with_mood("sad"));
        assert!(sad.starts_with(phrases::reflection_response(ob_domain::Valence::Negative)));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let g = MessageGenerator::default();
        let ctx = MessageContext::default();
        let a = g.generate_with(Trigger::EnergyLow, &ctx, at_utc_hour(10), &mut rng());
        let b = g.generate_with(Trigger::EnergyLow, &ctx, at_utc_hour(10), &mut rng());
        assert_eq!(a, b);
    }

    #[test]
    fn request_round_trip() {
        let g = MessageGenerator::default();
        let req: ContextualMessageRequest = serde_json::from_str(
            r#"{"trigger":"mode_change","context":{"mode":"build"},"version":"v1"}"#,
        )
        .unwrap();
        let resp = g.handle(&req);
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["version"], "v1");
        assert_eq!(json["chatMessage"]["role"], "assistant");
        assert!(json["chatMessage"]["content"].as_str().unwrap().contains("build"));
        assert_eq!(json["metadata"]["trigger"], "mode_change");
        let ts = json["metadata"]["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn missing_version_defaults_to_v1() {
        let g = MessageGenerator::default();
        let req: ContextualMessageRequest =
            serde_json::from_str(r#"{"trigger":"no_task"}"#).unwrap();
        assert_eq!(g.handle(&req).version, "v1");
    }

    #[test]
    fn unknown_version_is_echoed_and_served() {
        let g = MessageGenerator::default();
        let req = ContextualMessageRequest {
            version: Some("v2".into()),
            ..ContextualMessageRequest::new(Trigger::NoTask, None)
        };
        let resp = g.handle(&req);
        assert_eq!(resp.version, "v2");
        assert!(resp.chat_message.content.contains("task"));
    }

    #[test]
    fn unknown_trigger_is_rejected_by_schema() {
        assert!(serde_json::from_str::<ContextualMessageRequest>(r#"{"trigger":"nap"}"#).is_err());
    }

    #[test]
    fn bad_default_timezone_falls_back_to_utc() {
        let g = MessageGenerator::from_config(&MessagingConfig {
            default_timezone: "Nowhere/Special".into(),
            low_energy_threshold: 30,
        });
        assert_eq!(g.time_of_day_at(at_utc_hour(8), None), TimeOfDay::Morning);
    }

    #[test]
    fn blank_version_is_rejected() {
        let mut req = ContextualMessageRequest::new(Trigger::NoTask, None);
        assert!(req.validate().is_empty());
        req.version = Some("  ".into());
        assert_eq!(req.validate()[0].field, "version");
    }
}
