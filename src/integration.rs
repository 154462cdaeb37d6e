//! Integration layer
//!
//! Puts the conversation, the relay and the terminal together:
//! - [`session::ChatSession`] runs one chat: receiver task plus send loop
//! - [`receiver::MessageReceiver`] and [`sender::MessageSender`] are its halves
//! - [`console::Console`] renders the chat lines
//! - [`app_runner::AppRunner`] binds a session to the real world

pub mod app_runner;
pub mod console;
pub mod receiver;
pub mod sender;
pub mod session;
