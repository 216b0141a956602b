pub mod time_frame;
