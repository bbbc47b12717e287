fn main() {
    barscan::app::startup::startup();
}
