pub mod poll_state;
