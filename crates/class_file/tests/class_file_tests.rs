use modinfo_class_file::{AccessFlags, ClassFile, ClassFileError};

#[derive(Default)]
struct Bytes(Vec<u8>);
impl Bytes {
    fn u1(mut self, n: u8) -> Self {
        self.0.push(n);
        self
    }

    fn u2(mut self, n: u16) -> Self {
        self.0.extend_from_slice(&n.to_be_bytes());
        self
    }

    fn u4(mut self, n: u32) -> Self {
        self.0.extend_from_slice(&n.to_be_bytes());
        self
    }

    fn utf8(self, s: &str) -> Self {
        let mut b = self.u1(1).u2(s.len() as u16);
        b.0.extend_from_slice(s.as_bytes());
        b
    }

    fn class(self, name_index: u16) -> Self {
        self.u1(7).u2(name_index)
    }
}

// final class my.MyClass { private final int myField; public float add(int) }
fn my_class() -> Vec<u8> {
    Bytes::default()
        .u4(0xCAFEBABE)
        .u2(0)
        .u2(61)
        .u2(10)
        .utf8("my/MyClass")
        .class(1)
        .utf8("java/lang/Object")
        .class(3)
        .utf8("myField")
        .utf8("I")
        .utf8("add")
        .utf8("(I)F")
        .utf8("Code")
        .u2(0x0021)
        .u2(2)
        .u2(4)
        .u2(0)
        // fields
        .u2(1)
        .u2(0x0012)
        .u2(5)
        .u2(6)
        .u2(0)
        // methods
        .u2(1)
        .u2(0x0001)
        .u2(7)
        .u2(8)
        .u2(1)
        .u2(9)
        .u4(4)
        .u4(0x00010002)
        // attributes
        .u2(0)
        .0
}

fn with_class_file(f: impl FnOnce(ClassFile)) {
    f(ClassFile::parse(&my_class()).unwrap());
}

#[test]
fn test_class_name() {
    with_class_file(|class_file| assert_eq!("my/MyClass", class_file.class_name().unwrap()));
}

#[test]
fn test_version() {
    with_class_file(|class_file| assert_eq!((61, 0), class_file.version));
}

#[test]
fn test_is_not_a_module() {
    with_class_file(|class_file| {
        assert!(!class_file.is_module_info());
        assert_eq!(AccessFlags::PUBLIC | AccessFlags::SUPER, class_file.access_flags);
    });
}

#[test]
fn test_field_access_flags() {
    with_class_file(|class_file| {
        assert_eq!(
            AccessFlags::FINAL | AccessFlags::PRIVATE,
            class_file.fields[0].access_flags
        )
    });
}

#[test]
fn test_field_name() {
    with_class_file(|class_file| {
        assert_eq!(
            "myField",
            class_file
                .constant_pool
                .utf8(class_file.fields[0].name_index)
                .unwrap()
        )
    });
}

#[test]
fn test_method_attributes_are_kept_opaque() {
    with_class_file(|class_file| {
        let code = class_file.methods[0]
            .attributes
            .find_by_name("Code", &class_file.constant_pool)
            .unwrap();
        assert_eq!(code.info, [0x00, 0x01, 0x00, 0x02]);
    });
}

#[test]
fn test_write_is_byte_exact() {
    with_class_file(|class_file| assert_eq!(my_class(), class_file.to_bytes().unwrap()));
}

#[test]
fn test_truncated_method_attribute() {
    let mut bytes = my_class();
    // Drop the class attribute count and the last two bytes of the Code body.
    bytes.truncate(bytes.len() - 4);
    assert!(matches!(
        ClassFile::parse(&bytes),
        Err(ClassFileError::TruncatedAttributeBody { .. })
    ));
}
