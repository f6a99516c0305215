pub mod controller;
pub mod route;
pub mod runtime;
pub mod session;
pub mod view;

pub use controller::{update, Command, HomeEvent, HomeModel, Tab};
pub use route::{route, Route, RouteEvent};
pub use runtime::HomeSession;
pub use session::{GatewayError, SessionGateway, SignupForm};
