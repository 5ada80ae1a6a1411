pub mod clock;
pub mod machine;
pub mod result;
pub mod state;
pub mod view;
