use tagval::{Reflect, Struct};

pub struct Handle;

#[derive(Reflect)]
pub struct Meters(#[tag(valid = "min=0")] f64, String);

#[derive(Reflect)]
pub struct Session {
    #[tag(valid = "notempty")]
    pub token: String,
    #[reflect(skip)]
    pub handle: Handle,
}

fn main() {
    let meters = Meters(-1.0, String::new());
    let fields = meters.fields();
    assert_eq!(fields[0].name, "0");
    assert!(fields[0].positional);
    assert!(meters.field(1).is_some());

    let session = Session {
        token: String::new(),
        handle: Handle,
    };
    assert_eq!(session.fields().len(), 1);
    assert!(session.field(1).is_none());

    let errors = tagval::validate(&session).unwrap_err();
    assert_eq!(errors.to_string(), "token must not be empty");
}
