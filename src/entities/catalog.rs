//! Built-in club entities
//!
//! Listing defaults to any authenticated caller and every write needs an
//! admin. Seasons, categories and blog posts feed the public landing page,
//! so their lists are open to anonymous callers; fetching a single row of
//! them still needs a sign-in. User profiles are admin only.

use crate::core::auth::AccessPolicy;
use crate::core::entity::Entity;
use crate::core::query::SortKey;
use crate::core::schema::EntitySchema;
use crate::core::validation::{EntityValidationConfig, validators};
use crate::define_entity;

define_entity! {
    /// Club committee (board, youth section, ...)
    Committee("committee", "committees") {
        name: String,
        description: Option<String>,
        sort_order: i64,
        is_active: bool,
    }
    schema |s| s
        .default_sort(vec![SortKey::asc("sort_order")])
        .validation(
            EntityValidationConfig::new()
                .require(["name"])
                .add_validator("name", validators::string_length(1, 120)),
        )
}

define_entity! {
    Season("season", "seasons") {
        name: String,
        start_date: String,
        end_date: String,
        is_active: bool,
        is_closed: bool,
    }
    schema |s| s
        .read(AccessPolicy::Public)
        .default_sort(vec![SortKey::desc("start_date")])
        .validation(
            EntityValidationConfig::new()
                .require(["name", "start_date", "end_date"])
                .add_validator("start_date", validators::date_format("%Y-%m-%d"))
                .add_validator("end_date", validators::date_format("%Y-%m-%d")),
        )
}

define_entity! {
    /// Age/gender category a team plays in
    Category("category", "categories") {
        name: String,
        description: Option<String>,
        age_group: Option<String>,
        gender: Option<String>,
        sort_order: i64,
        is_active: bool,
        slug: Option<String>,
    }
    schema |s| s
        .read(AccessPolicy::Public)
        .default_sort(vec![SortKey::asc("sort_order"), SortKey::asc("name")])
        .validation(
            EntityValidationConfig::new()
                .require(["name"])
                .add_validator(
                    "gender",
                    validators::in_list(vec!["male".into(), "female".into(), "mixed".into()]),
                ),
        )
}

define_entity! {
    Club("club", "clubs") {
        name: String,
        short_name: Option<String>,
        city: Option<String>,
        founded_year: Option<i64>,
        logo_url: Option<String>,
        is_own_club: bool,
        is_active: bool,
    }
    schema |s| s
        .default_sort(vec![SortKey::asc("name")])
        .validation(
            EntityValidationConfig::new()
                .require(["name"])
                .add_validator("founded_year", validators::positive()),
        )
}

define_entity! {
    /// Monthly grant the club applies for
    Grant("grant", "grants") {
        name: String,
        description: Option<String>,
        month: i64,
        is_active: bool,
    }
    schema |s| s
        .default_sort(vec![SortKey::desc("month"), SortKey::asc("name")])
        .validation(
            EntityValidationConfig::new()
                .require(["name", "month"])
                .add_validator("month", |field: &str, value: &serde_json::Value| {
                    match value.as_i64() {
                        Some(month) if !(1..=12).contains(&month) => {
                            Err(format!("'{}' must be between 1 and 12 (got {})", field, month))
                        }
                        _ => Ok(()),
                    }
                }),
        )
}

define_entity! {
    BlogPost("blog post", "blog_posts") {
        title: String,
        slug: String,
        content: String,
        excerpt: Option<String>,
        author_id: Option<String>,
        status: String,
        published_at: Option<String>,
        category_id: Option<String>,
        image_url: Option<String>,
    }
    schema |s| s
        .read(AccessPolicy::Public)
        .default_sort(vec![SortKey::desc("published_at")])
        .validation(
            EntityValidationConfig::new()
                .require(["title", "slug", "content"])
                .add_validator(
                    "status",
                    validators::in_list(vec![
                        "draft".into(),
                        "published".into(),
                        "archived".into(),
                    ]),
                ),
        )
}

define_entity! {
    /// Note left on the admin dashboard
    Comment("comment", "comments") {
        content: String,
        author: String,
        user_email: Option<String>,
        comment_type: String,
    }
    schema |s| s
        .default_sort(vec![SortKey::desc("created_at")])
        .validation(
            EntityValidationConfig::new()
                .require(["content", "author"])
                .add_validator("user_email", validators::email()),
        )
}

define_entity! {
    Todo("todo", "todos") {
        title: String,
        description: Option<String>,
        priority: String,
        status: String,
        category: Option<String>,
        due_date: Option<String>,
        user_email: Option<String>,
    }
    schema |s| s
        .default_sort(vec![SortKey::desc("created_at")])
        .validation(
            EntityValidationConfig::new()
                .require(["title"])
                .add_validator(
                    "priority",
                    validators::in_list(vec![
                        "low".into(),
                        "medium".into(),
                        "high".into(),
                        "urgent".into(),
                    ]),
                )
                .add_validator("due_date", validators::date_format("%Y-%m-%d")),
        )
}

define_entity! {
    /// Match or training recording
    Video("video", "videos") {
        title: String,
        description: Option<String>,
        youtube_url: String,
        category_id: Option<String>,
        club_id: Option<String>,
        season_id: Option<String>,
        recording_date: Option<String>,
        is_active: bool,
    }
    schema |s| s
        .default_sort(vec![SortKey::desc("recording_date")])
        .validation(EntityValidationConfig::new().require(["title", "youtube_url"]))
}

define_entity! {
    TrainingSession("training session", "training_sessions") {
        title: String,
        description: Option<String>,
        session_date: String,
        session_time: Option<String>,
        location: Option<String>,
        category_id: String,
        season_id: String,
        status: Option<String>,
    }
    schema |s| s
        .default_sort(vec![SortKey::desc("session_date"), SortKey::desc("session_time")])
        .filter_alias("categoryId", "category_id")
        .filter_alias("seasonId", "season_id")
        .validation(
            EntityValidationConfig::new()
                .require(["title", "session_date", "category_id", "season_id"])
                .add_validator("session_date", validators::date_format("%Y-%m-%d")),
        )
}

define_entity! {
    RoleDefinition("role definition", "role_definitions") {
        name: String,
        display_name: String,
        description: Option<String>,
        permissions: Vec<String>,
        is_active: bool,
    }
    schema |s| s
        .read_only()
        .default_sort(vec![SortKey::asc("name")])
}

define_entity! {
    /// Club taking part in a category for one season
    ClubCategory("club category", "club_categories") {
        club_id: String,
        category_id: String,
        season_id: String,
        max_teams: Option<i64>,
        is_active: bool,
    }
    schema |s| s
        .default_sort(vec![SortKey::asc("club_id")])
        .validation(
            EntityValidationConfig::new()
                .require(["club_id", "category_id", "season_id"])
                .add_validator("max_teams", validators::positive()),
        )
}

define_entity! {
    /// Attendance of one member at one training session
    MemberAttendance("member attendance", "member_attendance") {
        member_id: String,
        training_session_id: String,
        attendance_status: String,
        notes: Option<String>,
        recorded_at: Option<String>,
        recorded_by: Option<String>,
    }
    schema |s| s
        .read_only()
        .default_sort(vec![SortKey::desc("member_id")])
        .filter_alias("trainingSessionId", "training_session_id")
}

define_entity! {
    /// Named lineup of a category within a season
    CategoryLineup("category lineup", "category_lineups") {
        name: String,
        description: Option<String>,
        category_id: String,
        season_id: String,
        created_by: Option<String>,
        is_active: Option<bool>,
    }
    schema |s| s
        .default_sort(vec![SortKey::asc("name")])
        .filter_alias("categoryId", "category_id")
        .filter_alias("seasonId", "season_id")
        .validation(
            EntityValidationConfig::new()
                .require(["name", "category_id", "season_id"])
                .add_validator("name", validators::string_length(1, 120)),
        )
}

define_entity! {
    /// Member placed in a lineup
    CategoryLineupMember("category lineup member", "category_lineup_members") {
        lineup_id: String,
        category_id: Option<String>,
        member_id: String,
        position: String,
        jersey_number: Option<i64>,
        is_captain: Option<bool>,
        is_vice_captain: Option<bool>,
        is_active: Option<bool>,
        added_at: Option<String>,
        added_by: Option<String>,
    }
    schema |s| s
        .read_only()
        .default_sort(vec![SortKey::asc("jersey_number")])
        .filter_alias("categoryId", "category_id")
        .filter_alias("lineupId", "lineup_id")
}

define_entity! {
    /// Sign-in account
    User("user", "users") {
        email: String,
        full_name: Option<String>,
        phone: Option<String>,
        role: Option<String>,
        is_blocked: Option<bool>,
        last_sign_in_at: Option<String>,
    }
    schema |s| s
        .read_only()
        .default_sort(vec![SortKey::asc("email")])
}

define_entity! {
    /// Role assignment of an account
    UserProfile("user profile", "user_profiles") {
        user_id: String,
        role: String,
        assigned_categories: Vec<String>,
        created_by: Option<String>,
    }
    schema |s| s
        .read(AccessPolicy::Admin)
        .read_only()
        .default_sort(vec![SortKey::desc("created_at")])
        .filter_alias("userId", "user_id")
}

/// Schemas of every built-in entity, in endpoint order
pub fn builtin_schemas() -> Vec<EntitySchema> {
    vec![
        Committee::schema(),
        Season::schema(),
        Category::schema(),
        Club::schema(),
        Grant::schema(),
        BlogPost::schema(),
        Comment::schema(),
        Todo::schema(),
        Video::schema(),
        TrainingSession::schema(),
        ClubCategory::schema(),
        MemberAttendance::schema(),
        CategoryLineup::schema(),
        CategoryLineupMember::schema(),
        RoleDefinition::schema(),
        User::schema(),
        UserProfile::schema(),
    ]
}
