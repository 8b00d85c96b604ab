use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Event loop exited without an interruption signal")]
    EventLoopExited,
}

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No text in message")]
    NoText,

    #[error("Message has no sender")]
    NoSender,
}

pub type Result<T> = std::result::Result<T, DbotError>;
