pub mod plugin_messages;
