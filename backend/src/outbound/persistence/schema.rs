//! Diesel schema for task and chat persistence.
//!
//! Mirrors the SQL under `migrations/`.

diesel::table! {
    /// One row per todo item.
    tasks (id) {
        id -> Int8,
        #[max_length = 255]
        owner_id -> Varchar,
        title -> Text,
        description -> Text,
        completed -> Bool,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    conversations (id) {
        id -> Int8,
        #[max_length = 255]
        owner_id -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Messages of a conversation. `owner_id` is copied from the parent row.
    chat_messages (id) {
        id -> Int8,
        conversation_id -> Int8,
        #[max_length = 255]
        owner_id -> Varchar,
        #[max_length = 10]
        sender -> Varchar,
        content -> Text,
        tool_name -> Nullable<Text>,
        tool_arguments -> Nullable<Jsonb>,
        tool_output -> Nullable<Jsonb>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(chat_messages -> conversations (conversation_id));

diesel::allow_tables_to_appear_in_same_query!(conversations, chat_messages);
