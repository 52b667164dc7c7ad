fn main() {
    std::process::exit(cmdcase::run());
}
