pub mod user;

pub use user::mount_user_routes;
