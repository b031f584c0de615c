fn main() {
    blogly_api::main()
}
