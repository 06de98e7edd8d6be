fn main() -> std::process::ExitCode {
    themedeck_lib::run()
}
