use tagval::{Kind, Reflect, Struct};

#[derive(Reflect)]
pub struct Signup {
    #[tag(valid = "notempty,max=32")]
    pub login: String,
    #[tag(valid = "min=18", json = "age")]
    pub age: u8,
    internal: u32,
}

fn main() {
    let signup = Signup {
        login: "ann".to_string(),
        age: 30,
        internal: 7,
    };

    let fields = signup.fields();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].name, "login");
    assert_eq!(fields[1].tag("json"), Some("age"));
    assert!(!fields[2].exported);
    assert_eq!(signup.internal, 7);

    assert!(matches!(signup.kind(), Kind::Struct(_)));
    assert!(tagval::validate(&signup).is_ok());
}
