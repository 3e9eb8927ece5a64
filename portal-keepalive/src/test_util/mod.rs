pub mod mock_portal;

pub use mock_portal::{MockCalls, MockPortal, MOCK_LOGIN_PAGE};
