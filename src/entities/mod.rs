//! Entity declarations
//!
//! `macros` provides `define_entity!`; `catalog` declares the club entities
//! served by default.

pub mod catalog;
pub mod macros;

pub use catalog::{
    BlogPost, Category, CategoryLineup, CategoryLineupMember, Club, ClubCategory, Comment,
    Committee, Grant, MemberAttendance, RoleDefinition, Season, Todo, TrainingSession, User,
    UserProfile, Video, builtin_schemas,
};
