mod launcher;

pub use launcher::run_launcher;
