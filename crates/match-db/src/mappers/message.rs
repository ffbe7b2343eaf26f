//! Message entity <-> model mapper

use match_core::entities::{Message, MessageBody, MessageKind};
use match_core::error::DomainError;
use match_core::value_objects::Snowflake;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
impl TryFrom<MessageModel> for Message {
    type Error = DomainError;

    fn try_from(model: MessageModel) -> Result<Self, Self::Error> {
        let kind = MessageKind::parse(&model.kind).ok_or_else(|| {
            DomainError::DatabaseError(format!("unknown message kind '{}'", model.kind))
        })?;

        Ok(Message {
            id: Snowflake::new(model.id),
            relationship_id: Snowflake::new(model.relationship_id),
            from: Snowflake::new(model.sender_id),
            to: Snowflake::new(model.recipient_id),
            body: MessageBody::from_parts(kind, model.content),
            created_at: model.created_at,
        })
    }
}

/// Convert Message entity reference to values for database insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub relationship_id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub kind: &'static str,
    pub content: &'a str,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            relationship_id: message.relationship_id.into_inner(),
            sender_id: message.from.into_inner(),
            recipient_id: message.to.into_inner(),
            kind: message.body.kind().as_str(),
            content: message.body.content(),
        }
    }
}

/// Convert a batch of rows, failing on the first unreadable one
pub(crate) fn messages_from_models(models: Vec<MessageModel>) -> Result<Vec<Message>, DomainError> {
    models.into_iter().map(Message::try_from).collect()
}
