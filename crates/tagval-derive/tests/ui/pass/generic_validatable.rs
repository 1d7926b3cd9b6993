use tagval::{BoxError, Reflect, Validatable};

#[derive(Reflect)]
pub struct Page<T> {
    #[tag(valid = "max=2")]
    pub items: Vec<T>,
}

#[derive(Reflect)]
#[reflect(validatable)]
pub struct Range {
    pub low: i64,
    pub high: i64,
}

impl Validatable for Range {
    fn validate(&self) -> Result<(), BoxError> {
        if self.low > self.high {
            return Err("low must not exceed high".into());
        }
        Ok(())
    }
}

fn main() {
    let page = Page {
        items: vec![Range { low: 2, high: 1 }],
    };
    assert!(page.as_validatable().is_none());

    let errors = tagval::validate(&page).unwrap_err();
    assert_eq!(errors.to_string(), "low must not exceed high");
}
