use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match clinic_scheduler_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("clinic-scheduler: {e}");
            ExitCode::FAILURE
        }
    }
}
