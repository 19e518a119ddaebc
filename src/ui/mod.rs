pub mod admin;
pub mod app;
pub mod book;
pub mod components;
pub mod dashboard;
pub mod events;
pub mod form;
pub mod home;
pub mod layout;
pub mod nav;
pub mod profile;
pub mod state;
pub mod view;

pub use app::{run_app_async, CleanlyApp};
pub use layout::{TuiLayout, ViewLayout};
pub use nav::{Navigation, Route};
pub use state::{Fetch, Notice, RequestScope};
pub use view::{View, ViewAction, ViewManager};
