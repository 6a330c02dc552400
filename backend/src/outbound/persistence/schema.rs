//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. The
//! `diesel print-schema` command regenerates them from a migrated database.

diesel::table! {
    /// Registered accounts. Root of every per-user table.
    users (id) {
        /// Primary key.
        id -> Uuid,
        /// Lower-cased login email, unique.
        email -> Text,
        /// Name shown in the dashboard.
        display_name -> Text,
        /// Argon2id PHC string.
        password_hash -> Text,
        /// Registration time.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Mood journal rows.
    mood_entries (id) {
        id -> Uuid,
        user_id -> Uuid,
        /// 1..=10.
        score -> Int2,
        notes -> Text,
        recorded_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Stored insights.
    insights (id) {
        id -> Uuid,
        user_id -> Uuid,
        kind -> Text,
        title -> Text,
        description -> Text,
        priority -> Text,
        actionable -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Goals with progress tracking.
    goals (id) {
        id -> Uuid,
        user_id -> Uuid,
        title -> Text,
        description -> Text,
        category -> Text,
        target_date -> Date,
        /// 0..=100.
        progress -> Int2,
        status -> Text,
        priority -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Saved notification preferences, one row per user.
    notification_settings (user_id) {
        user_id -> Uuid,
        mood_reminders -> Bool,
        reminder_time -> Time,
        goal_updates -> Bool,
        insight_alerts -> Bool,
        support_group_messages -> Bool,
        email_enabled -> Bool,
        push_enabled -> Bool,
    }
}

diesel::table! {
    /// Saved privacy preferences, one row per user.
    privacy_settings (user_id) {
        user_id -> Uuid,
        profile_visibility -> Text,
        share_mood_with_therapist -> Bool,
        anonymous_in_groups -> Bool,
        data_retention_days -> Int4,
    }
}

diesel::table! {
    /// Support group catalogue.
    support_groups (id) {
        id -> Uuid,
        name -> Text,
        topic -> Text,
        description -> Text,
        capacity -> Int4,
    }
}

diesel::table! {
    /// Group memberships.
    support_group_members (group_id, user_id) {
        group_id -> Uuid,
        user_id -> Uuid,
        joined_at -> Timestamptz,
    }
}

diesel::table! {
    /// Therapist directory.
    therapists (id) {
        id -> Uuid,
        name -> Text,
        specialties -> Array<Text>,
        accepting_clients -> Bool,
    }
}

diesel::table! {
    /// Requests for a therapist to get in touch.
    contact_requests (id) {
        id -> Uuid,
        user_id -> Uuid,
        therapist_id -> Uuid,
        message -> Text,
        preferred_contact -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(mood_entries -> users (user_id));
diesel::joinable!(insights -> users (user_id));
diesel::joinable!(goals -> users (user_id));
diesel::joinable!(notification_settings -> users (user_id));
diesel::joinable!(privacy_settings -> users (user_id));
diesel::joinable!(support_group_members -> support_groups (group_id));
diesel::joinable!(support_group_members -> users (user_id));
diesel::joinable!(contact_requests -> therapists (therapist_id));
diesel::joinable!(contact_requests -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    mood_entries,
    insights,
    goals,
    notification_settings,
    privacy_settings,
    support_groups,
    support_group_members,
    therapists,
    contact_requests,
);
