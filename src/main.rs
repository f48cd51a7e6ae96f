//! geotimer main entrypoint.

use geotimer::run;
use geotimer::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {}", e));
        std::process::exit(1);
    }
}
