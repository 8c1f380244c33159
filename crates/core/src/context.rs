//! Sanitized escalation contexts, one typed shape per workflow variant.
//!
//! An [`EscalationContext`] is only ever produced by
//! [`normalize`](crate::intake::normalize) and is never mutated afterwards.
//! Field declaration order is the serialization order on the wire.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::ValidationError;

/// Which escalation workflow the intake form belongs to.
///
/// The two variants submit different field sets to different agent
/// endpoints and historically used different body wrapper keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowVariant {
    /// POS agent-assist escalations (`callerType` free-form field).
    AgentAssist,
    /// Customer-support escalations (yes/no `isOwnerVerified` field, submitter identity).
    CustomerSupport,
}

impl WorkflowVariant {
    /// Parse the configuration spelling (`agent_assist` / `customer_support`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "agent_assist" => Some(Self::AgentAssist),
            "customer_support" => Some(Self::CustomerSupport),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AgentAssist => "agent_assist",
            Self::CustomerSupport => "customer_support",
        }
    }

    /// The body wrapper key this variant's endpoint has historically accepted.
    pub fn default_context_key(self) -> ContextKey {
        match self {
            Self::AgentAssist => ContextKey::SupportEscalationContext,
            Self::CustomerSupport => ContextKey::Context,
        }
    }
}

/// Top-level key wrapping the context in the job-creation body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKey {
    /// `{"context": {...}}`
    Context,
    /// `{"supportEscalationContext": {...}}`
    SupportEscalationContext,
}

impl ContextKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "context" => Some(Self::Context),
            "supportEscalationContext" => Some(Self::SupportEscalationContext),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Context => "context",
            Self::SupportEscalationContext => "supportEscalationContext",
        }
    }
}

/// Context submitted by the POS agent-assist workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAssistContext {
    pub external_ref: String,
    pub ticket_link: String,
    /// Merchant id.
    pub mid: String,
    /// Merchant business name ("doing business as").
    pub dba: String,
    /// Caller type after legacy yes/no remapping.
    pub caller_type: String,
    pub software_type: String,
    pub escalation_type: String,
    pub escalation_reason: String,
    pub merchant_reason: String,
    /// Free-text description written by the submitting agent.
    pub additional_context: String,
}

/// Context submitted by the customer-support workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSupportContext {
    pub link_to_resource: String,
    pub ticket_link: String,
    pub mid: String,
    pub dba: String,
    pub is_owner_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    /// Free-text description written by the submitting agent.
    pub additional_notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
}

/// A validated, identity-free escalation context ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EscalationContext {
    AgentAssist(AgentAssistContext),
    CustomerSupport(CustomerSupportContext),
}

impl EscalationContext {
    pub fn variant(&self) -> WorkflowVariant {
        match self {
            Self::AgentAssist(_) => WorkflowVariant::AgentAssist,
            Self::CustomerSupport(_) => WorkflowVariant::CustomerSupport,
        }
    }

    /// Wire name of the free-text field that must be non-empty to submit.
    pub fn free_text_field(&self) -> &'static str {
        match self {
            Self::AgentAssist(_) => "additionalContext",
            Self::CustomerSupport(_) => "additionalNotes",
        }
    }

    /// The submitter's own description of the escalation.
    ///
    /// Echoed back above the AI answer when the result is delivered.
    pub fn free_text(&self) -> &str {
        match self {
            Self::AgentAssist(ctx) => &ctx.additional_context,
            Self::CustomerSupport(ctx) => &ctx.additional_notes,
        }
    }

    /// Fail unless the free-text field carries content.
    pub fn ensure_submittable(&self) -> Result<(), ValidationError> {
        if self.free_text().trim().is_empty() {
            return Err(ValidationError::EmptyField(self.free_text_field()));
        }
        Ok(())
    }

    /// Wrap the context under `key` for the job-creation request body.
    pub fn request_body(&self, key: ContextKey) -> JobRequestBody<'_> {
        JobRequestBody { key, context: self }
    }
}

/// `{"<key>": <context>}` with a key chosen at runtime.
#[derive(Debug, Clone, Copy)]
pub struct JobRequestBody<'a> {
    key: ContextKey,
    context: &'a EscalationContext,
}

impl Serialize for JobRequestBody<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key.as_str(), self.context)?;
        map.end()
    }
}
