//! Guest collection provisioning binary.

use collections_provision::cli::CLI;

fn main() {
    CLI::execute();
}
