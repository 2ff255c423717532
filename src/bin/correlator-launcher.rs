fn main() {
    correlator_launcher::run_launcher();
}
