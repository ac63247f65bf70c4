mod app;
mod audio;
mod config;
mod metadata;
mod mpris;
mod runtime;
mod schedule;
mod source;
mod ui;
mod wave;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
