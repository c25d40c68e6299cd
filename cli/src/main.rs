fn main() {
    power_tariffs_cli::run();
}
