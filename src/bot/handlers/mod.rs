pub mod callback;
pub mod message;
pub mod text;

use teloxide::{
    dispatching::{dialogue, dialogue::InMemStorage, UpdateHandler},
    prelude::*,
};

use crate::database::connection::DatabaseManager;
use crate::services::notifier::Notifier;

/// Per-chat conversation state. The only multi-step flow is code entry:
/// the "activate" button moves the chat to `AwaitingCode`, a successful
/// redemption (or a persistence failure) moves it back to `Idle`.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingCode,
}

pub type ConversationDialogue = Dialogue<ConversationState, InMemStorage<ConversationState>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub struct BotHandler {
    pub db: DatabaseManager,
    pub notifier: Notifier,
}

impl BotHandler {
    pub fn new(db: DatabaseManager, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        use teloxide::dispatching::UpdateFilterExt;

        let db = self.db.clone();
        let notifier = self.notifier.clone();
        let db_callback = self.db.clone();
        let db_text = self.db.clone();
        let notifier_text = self.notifier.clone();

        dialogue::enter::<Update, InMemStorage<ConversationState>, ConversationState, _>()
            .branch(
                Update::filter_message()
                    .filter_command::<crate::bot::commands::Command>()
                    .endpoint(move |bot: Bot, msg: Message, cmd: crate::bot::commands::Command| {
                        let db = db.clone();
                        let notifier = notifier.clone();
                        async move { message::command_handler(bot, msg, cmd, db, notifier).await }
                    }),
            )
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, q: CallbackQuery, dialogue: ConversationDialogue| {
                    let db = db_callback.clone();
                    async move { callback::callback_handler(bot, q, dialogue, db).await }
                },
            ))
            .branch(Update::filter_message().endpoint(
                move |bot: Bot, msg: Message, dialogue: ConversationDialogue| {
                    let db = db_text.clone();
                    let notifier = notifier_text.clone();
                    async move { text::text_handler(bot, msg, dialogue, db, notifier).await }
                },
            ))
    }
}
