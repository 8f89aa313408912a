use teloxide::prelude::*;
use teloxide::types::ChatId;

/// Outbound message gateway: user-facing notices plus audit notices to the
/// configured owner account.
#[derive(Clone)]
pub struct Notifier {
    bot: Bot,
    owner_chat_id: ChatId,
}

impl Notifier {
    pub fn new(bot: Bot, owner_chat_id: i64) -> Self {
        Self {
            bot,
            owner_chat_id: ChatId(owner_chat_id),
        }
    }

    pub async fn notify_user(&self, user_id: i64, text: &str) -> ResponseResult<()> {
        self.bot.send_message(ChatId(user_id), text).await?;
        Ok(())
    }

    pub async fn notify_owner(&self, text: &str) -> ResponseResult<()> {
        self.bot.send_message(self.owner_chat_id, text).await?;
        Ok(())
    }

    pub fn is_owner(&self, chat_id: ChatId) -> bool {
        chat_id == self.owner_chat_id
    }
}
