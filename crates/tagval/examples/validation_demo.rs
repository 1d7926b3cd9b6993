//! Validation demo: built-in rules, custom rules and configuration

use std::collections::BTreeMap;

use tagval::{
    with_rule, BoxError, Kind, Primitive, Reflect, Validatable, ValidationError, Validator,
    ValidatorConfig,
};

#[derive(Reflect)]
pub struct Contact {
    #[tag(valid = "notempty,regex=^[^@]+@[^@]+$")]
    pub email: String,
    #[tag(valid = "min=7,max=15")]
    pub phone: Option<String>,
}

#[derive(Reflect)]
#[reflect(validatable)]
pub struct Booking {
    #[tag(valid = "notempty,max=32")]
    pub guest: String,
    #[tag(valid = "date=YYYY-MM-DD")]
    pub arrival: String,
    #[tag(valid = "date=YYYY-MM-DD")]
    pub departure: String,
    #[tag(valid = "min=1,max=8,even")]
    pub people: u8,
    #[tag(valid = "notnil")]
    pub contact: Option<Box<Contact>>,
    #[tag(valid = "max=3")]
    pub extras: BTreeMap<String, u32>,
    #[tag(valid = "-")]
    pub comment: String,
}

impl Validatable for Booking {
    fn validate(&self) -> Result<(), BoxError> {
        if self.departure < self.arrival {
            return Err("departure must not precede arrival".into());
        }
        Ok(())
    }
}

fn even(value: &dyn Reflect, name: &str, _: &str) -> Result<(), ValidationError> {
    match value.kind().resolve() {
        Some(Kind::Primitive(Primitive::Uint(n))) if n % 2 == 0 => Ok(()),
        Some(Kind::Primitive(Primitive::Uint(_))) => Err(ValidationError::field(
            name,
            format!("{} must be even", name),
        )),
        _ => Err(ValidationError::unsupported(name)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("tagval demo");
    println!("===========\n");

    let booking = Booking {
        guest: String::new(),
        arrival: "2024-07-14".into(),
        departure: "2024-07-10".into(),
        people: 9,
        contact: Some(Box::new(Contact {
            email: "guest.example.org".into(),
            phone: Some("0123".into()),
        })),
        extras: BTreeMap::from([("breakfast".to_string(), 2)]),
        comment: String::new(),
    };

    println!("Default rules, `even` unknown:");
    match tagval::validate(&booking) {
        Ok(()) => println!("  valid"),
        Err(errors) => {
            for error in &errors {
                println!("  [{}] {}", error.code(), error);
            }
        }
    }

    println!("\nCustom rule registered next to the defaults:");
    let validator = Validator::new([tagval::default_rules(), with_rule("even", even)]);
    if let Err(errors) = validator.validate(&booking) {
        println!("  {}", errors);
    }

    println!("\nConfiguration from the environment:");
    let config = ValidatorConfig::from_env()?;
    println!("  {:?}", config);
    let validator = Validator::from_config(config)?;
    let verdict = match validator.validate(&booking) {
        Ok(()) => "valid".to_string(),
        Err(errors) => format!("{} violation(s)", errors.len()),
    };
    println!("  {}", verdict);

    println!("\nAs JSON:");
    if let Err(errors) = tagval::validate(&booking) {
        println!("{}", serde_json::to_string_pretty(&errors.to_json())?);
    }

    Ok(())
}
