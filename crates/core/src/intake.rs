//! Raw intake records and the normalization transform.
//!
//! An [`IntakeRecord`] is what the form step hands over: optional submitter
//! identity fields plus every form field as a loosely-typed JSON scalar.
//! [`normalize`] turns it into a [`NormalizedIntake`] (identity split off,
//! legacy yes/no answers remapped, required fields checked) without touching
//! the record itself.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::context::{AgentAssistContext, CustomerSupportContext, EscalationContext, WorkflowVariant};
use crate::error::ValidationError;

/// Legacy yes/no caller-type answers and the agent-assist caller types they stand for.
///
/// Any other caller type is a real value and is forwarded unchanged.
const CALLER_TYPE_ALIASES: &[(&str, &str)] = &[("Yes", "Owner"), ("No", "Unauthorized User")];

/// The only accepted answers for `isOwnerVerified`.
const OWNER_VERIFIED_VALUES: &[(&str, bool)] = &[("Yes", true), ("No", false)];

const AGENT_ASSIST_FIELDS: &[&str] = &[
    "externalRef",
    "ticketLink",
    "mid",
    "dba",
    "callerType",
    "softwareType",
    "escalationType",
    "escalationReason",
    "merchantReason",
    "additionalContext",
];

const CUSTOMER_SUPPORT_FIELDS: &[&str] = &[
    "linkToResource",
    "ticketLink",
    "mid",
    "dba",
    "isOwnerVerified",
    "scenario",
    "additionalNotes",
    "contactName",
];

/// The person who filed the escalation, as known to the chat platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitter {
    /// Chat-platform user id. Never empty.
    pub external_id: String,
    pub display_name: String,
    pub email: String,
}

/// Form submission exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRecord {
    #[serde(default)]
    pub submitter_slack_user_id: Option<String>,
    #[serde(default)]
    pub submitter_slack_name: Option<String>,
    #[serde(default)]
    pub submitter_slack_email: Option<String>,
    /// Every other form field, keyed by its wire name.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl IntakeRecord {
    /// Convenience constructor for string-only forms.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
            ..Default::default()
        }
    }

    /// Attach submitter identity fields.
    pub fn with_submitter(mut self, external_id: &str, name: &str, email: &str) -> Self {
        self.submitter_slack_user_id = Some(external_id.to_string());
        self.submitter_slack_name = Some(name.to_string());
        self.submitter_slack_email = Some(email.to_string());
        self
    }

    /// The submitter block, if the form carried one.
    ///
    /// Present iff `submitterSlackUserId` was supplied; an empty id is rejected.
    pub fn submitter(&self) -> Result<Option<Submitter>, ValidationError> {
        let Some(external_id) = self.submitter_slack_user_id.as_deref() else {
            return Ok(None);
        };
        if external_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("submitterSlackUserId"));
        }
        Ok(Some(Submitter {
            external_id: external_id.to_string(),
            display_name: self.submitter_slack_name.clone().unwrap_or_default(),
            email: self.submitter_slack_email.clone().unwrap_or_default(),
        }))
    }
}

/// Output of [`normalize`]: identity and context as separate values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedIntake {
    pub submitter: Option<Submitter>,
    pub context: EscalationContext,
}

/// Validate a raw record and build the sanitized context for `variant`.
pub fn normalize(
    record: &IntakeRecord,
    variant: WorkflowVariant,
) -> Result<NormalizedIntake, ValidationError> {
    let submitter = record.submitter()?;
    let fields = FieldReader::new(&record.fields);

    let (context, known) = match variant {
        WorkflowVariant::AgentAssist => (
            EscalationContext::AgentAssist(agent_assist(&fields)?),
            AGENT_ASSIST_FIELDS,
        ),
        WorkflowVariant::CustomerSupport => (
            EscalationContext::CustomerSupport(customer_support(&fields)?),
            CUSTOMER_SUPPORT_FIELDS,
        ),
    };

    for name in record.fields.keys().filter(|k| !known.contains(&k.as_str())) {
        tracing::debug!(field = %name, variant = variant.as_str(), "Dropping unknown intake field");
    }

    Ok(NormalizedIntake { submitter, context })
}

fn agent_assist(fields: &FieldReader<'_>) -> Result<AgentAssistContext, ValidationError> {
    Ok(AgentAssistContext {
        external_ref: fields.required("externalRef")?,
        ticket_link: fields.required("ticketLink")?,
        mid: fields.required("mid")?,
        dba: fields.required("dba")?,
        caller_type: map_caller_type(fields.required("callerType")?),
        software_type: fields.required("softwareType")?,
        escalation_type: fields.required("escalationType")?,
        escalation_reason: fields.required("escalationReason")?,
        merchant_reason: fields.required("merchantReason")?,
        additional_context: fields.required("additionalContext")?,
    })
}

fn customer_support(fields: &FieldReader<'_>) -> Result<CustomerSupportContext, ValidationError> {
    Ok(CustomerSupportContext {
        link_to_resource: fields.required("linkToResource")?,
        ticket_link: fields.required("ticketLink")?,
        mid: fields.required("mid")?,
        dba: fields.required("dba")?,
        is_owner_verified: map_owner_verified(&fields.required("isOwnerVerified")?)?,
        scenario: fields.optional("scenario")?,
        additional_notes: fields.required("additionalNotes")?,
        contact_name: fields.optional("contactName")?,
    })
}

fn map_caller_type(raw: String) -> String {
    CALLER_TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == raw)
        .map(|(_, caller_type)| (*caller_type).to_string())
        .unwrap_or(raw)
}

fn map_owner_verified(raw: &str) -> Result<bool, ValidationError> {
    OWNER_VERIFIED_VALUES
        .iter()
        .find(|(answer, _)| *answer == raw)
        .map(|(_, verified)| *verified)
        .ok_or_else(|| ValidationError::UnrecognizedValue {
            field: "isOwnerVerified",
            value: raw.to_string(),
        })
}

/// Read-only view over the raw field map that renders scalars as strings.
struct FieldReader<'a> {
    fields: &'a BTreeMap<String, Value>,
}

impl<'a> FieldReader<'a> {
    fn new(fields: &'a BTreeMap<String, Value>) -> Self {
        Self { fields }
    }

    fn required(&self, name: &'static str) -> Result<String, ValidationError> {
        match self.scalar(name)? {
            None => Err(ValidationError::MissingField(name)),
            Some(value) if value.trim().is_empty() => Err(ValidationError::EmptyField(name)),
            Some(value) => Ok(value),
        }
    }

    /// Absent and blank both read as `None`.
    fn optional(&self, name: &'static str) -> Result<Option<String>, ValidationError> {
        Ok(self.scalar(name)?.filter(|v| !v.trim().is_empty()))
    }

    fn scalar(&self, name: &str) -> Result<Option<String>, ValidationError> {
        match self.fields.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(Value::Array(_) | Value::Object(_)) => Err(ValidationError::NotScalar {
                field: name.to_string(),
            }),
        }
    }
}
