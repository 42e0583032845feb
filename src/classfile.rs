//! Narrow class-file inspection.
//!
//! Parses just enough of the JVM class-file format (constant pool plus the
//! method table) to answer one question: does this class declare
//! `public static void main(String[])`? Everything else in the file is
//! skipped by size. A full bytecode model is deliberately out of scope.

use thiserror::Error;

const MAGIC: u32 = 0xCAFE_BABE;

pub(crate) const ACC_PUBLIC: u16 = 0x0001;
pub(crate) const ACC_STATIC: u16 = 0x0008;

const MAIN_METHOD_NAME: &str = "main";
const MAIN_METHOD_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("invalid UTF-8 string in constant pool: {0}")]
    Utf8Decode(#[from] std::string::FromUtf8Error),
}

/// Returns whether `bytes` is a class file declaring a `main` method with the
/// conventional entry-point signature: `public`, `static`, `void` return and a
/// single `String[]` parameter.
pub fn has_main_method(bytes: &[u8]) -> Result<bool, ClassParseError> {
    let mut reader = ClassReader::new(bytes);
    reader.expect_magic()?;
    let _minor_version = reader.read_u2()?;
    let _major_version = reader.read_u2()?;
    let pool = ConstantPool::parse(&mut reader)?;

    let _access_flags = reader.read_u2()?;
    let _this_class = reader.read_u2()?;
    let _super_class = reader.read_u2()?;

    let interfaces_count = reader.read_u2()?;
    for _ in 0..interfaces_count {
        reader.read_u2()?;
    }

    let fields_count = reader.read_u2()?;
    for _ in 0..fields_count {
        skip_member(&mut reader)?;
    }

    let methods_count = reader.read_u2()?;
    for _ in 0..methods_count {
        let access_flags = reader.read_u2()?;
        let name_index = reader.read_u2()?;
        let descriptor_index = reader.read_u2()?;
        let attributes_count = reader.read_u2()?;
        skip_attributes(&mut reader, attributes_count)?;

        if access_flags & (ACC_PUBLIC | ACC_STATIC) != (ACC_PUBLIC | ACC_STATIC) {
            continue;
        }
        if pool.utf8(name_index)? != MAIN_METHOD_NAME {
            continue;
        }
        if pool.utf8(descriptor_index)? == MAIN_METHOD_DESCRIPTOR {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Constant pool with only Utf8 entries materialized. Every other tag is
/// skipped by its fixed size; Long and Double take two pool slots.
struct ConstantPool {
    entries: Vec<Option<String>>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries: Vec<Option<String>> = Vec::with_capacity(count);
        entries.push(None); // index 0 unused

        while entries.len() < count {
            let tag = reader.read_u1()?;
            match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    entries.push(Some(String::from_utf8(bytes.to_vec())?));
                }
                3 | 4 | 9 | 10 | 11 | 12 | 17 | 18 => {
                    reader.skip(4)?;
                    entries.push(None);
                }
                5 | 6 => {
                    reader.skip(8)?;
                    entries.push(None);
                    entries.push(None);
                }
                7 | 8 | 16 | 19 | 20 => {
                    reader.skip(2)?;
                    entries.push(None);
                }
                15 => {
                    reader.skip(3)?;
                    entries.push(None);
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            }
        }

        Ok(Self { entries })
    }

    fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        self.entries
            .get(index as usize)
            .and_then(|entry| entry.as_deref())
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }
}

struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn expect_magic(&mut self) -> Result<(), ClassParseError> {
        if self.read_u4()? != MAGIC {
            return Err(ClassParseError::InvalidMagic);
        }
        Ok(())
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassParseError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.read_slice(len).map(|_| ())
    }

    fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        Ok(self.read_slice(1)?[0])
    }

    fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

fn skip_attributes(reader: &mut ClassReader<'_>, count: u16) -> Result<(), ClassParseError> {
    for _ in 0..count {
        reader.read_u2()?; // attribute_name_index
        let length = reader.read_u4()? as usize;
        reader.skip(length)?;
    }
    Ok(())
}

fn skip_member(reader: &mut ClassReader<'_>) -> Result<(), ClassParseError> {
    reader.read_u2()?; // access_flags
    reader.read_u2()?; // name_index
    reader.read_u2()?; // descriptor_index
    let attributes_count = reader.read_u2()?;
    skip_attributes(reader, attributes_count)
}

#[cfg(test)]
pub(crate) mod sample {
    //! Synthesizes minimal class files for tests: a valid constant pool, no
    //! code attributes, just the structure the inspector walks.

    use super::{ACC_PUBLIC, ACC_STATIC};

    pub(crate) const PUBLIC_STATIC: u16 = ACC_PUBLIC | ACC_STATIC;
    pub(crate) const MAIN_DESCRIPTOR: &str = "([Ljava/lang/String;)V";

    pub(crate) fn push_u2(out: &mut Vec<u8>, value: u16) {
        out.extend_from_slice(&value.to_be_bytes());
    }

    pub(crate) fn push_u4(out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_be_bytes());
    }

    fn push_utf8(out: &mut Vec<u8>, value: &str) {
        out.push(1);
        push_u2(out, value.len() as u16);
        out.extend_from_slice(value.as_bytes());
    }

    fn push_class(out: &mut Vec<u8>, name_index: u16) {
        out.push(7);
        push_u2(out, name_index);
    }

    /// Builds a class file declaring the given methods, each a
    /// `(access_flags, name, descriptor)` triple.
    pub(crate) fn class_bytes(methods: &[(u16, &str, &str)]) -> Vec<u8> {
        let mut out = Vec::new();
        push_u4(&mut out, 0xCAFE_BABE);
        push_u2(&mut out, 0); // minor
        push_u2(&mut out, 52); // major (Java 8)

        // Pool: [1] this name, [2] this class, [3] super name, [4] super
        // class, then one Utf8 pair per method.
        push_u2(&mut out, 5 + 2 * methods.len() as u16);
        push_utf8(&mut out, "test/Sample");
        push_class(&mut out, 1);
        push_utf8(&mut out, "java/lang/Object");
        push_class(&mut out, 3);
        for (_, name, descriptor) in methods {
            push_utf8(&mut out, name);
            push_utf8(&mut out, descriptor);
        }

        push_u2(&mut out, 0x0021); // ACC_PUBLIC | ACC_SUPER
        push_u2(&mut out, 2); // this_class
        push_u2(&mut out, 4); // super_class
        push_u2(&mut out, 0); // interfaces
        push_u2(&mut out, 0); // fields

        push_u2(&mut out, methods.len() as u16);
        for (i, (flags, _, _)) in methods.iter().enumerate() {
            push_u2(&mut out, *flags);
            push_u2(&mut out, 5 + 2 * i as u16); // name
            push_u2(&mut out, 6 + 2 * i as u16); // descriptor
            push_u2(&mut out, 0); // attributes
        }

        out
    }

    pub(crate) fn entry_point_class() -> Vec<u8> {
        class_bytes(&[(PUBLIC_STATIC, "main", MAIN_DESCRIPTOR)])
    }
}

#[cfg(test)]
mod tests {
    use super::sample::{self, MAIN_DESCRIPTOR, PUBLIC_STATIC};
    use super::*;

    #[test]
    fn detects_conventional_main_method() {
        let bytes = sample::class_bytes(&[
            (ACC_PUBLIC, "<init>", "()V"),
            (PUBLIC_STATIC, "main", MAIN_DESCRIPTOR),
        ]);
        assert!(has_main_method(&bytes).unwrap());
    }

    #[test]
    fn rejects_near_miss_signatures() {
        let wrong_return = sample::class_bytes(&[(PUBLIC_STATIC, "main", "([Ljava/lang/String;)I")]);
        assert!(!has_main_method(&wrong_return).unwrap());

        let instance_method = sample::class_bytes(&[(ACC_PUBLIC, "main", MAIN_DESCRIPTOR)]);
        assert!(!has_main_method(&instance_method).unwrap());

        let not_public = sample::class_bytes(&[(ACC_STATIC, "main", MAIN_DESCRIPTOR)]);
        assert!(!has_main_method(&not_public).unwrap());

        let wrong_parameter = sample::class_bytes(&[(PUBLIC_STATIC, "main", "(Ljava/lang/String;)V")]);
        assert!(!has_main_method(&wrong_parameter).unwrap());

        let wrong_name = sample::class_bytes(&[(PUBLIC_STATIC, "run", MAIN_DESCRIPTOR)]);
        assert!(!has_main_method(&wrong_name).unwrap());
    }

    #[test]
    fn rejects_invalid_magic() {
        let mut bytes = sample::entry_point_class();
        bytes[0] = 0xDE;
        assert!(matches!(
            has_main_method(&bytes),
            Err(ClassParseError::InvalidMagic)
        ));
    }

    #[test]
    fn truncated_file_is_an_error_not_a_panic() {
        let bytes = sample::entry_point_class();
        for len in 0..bytes.len() {
            match has_main_method(&bytes[..len]) {
                Err(ClassParseError::UnexpectedEof) => {}
                other => panic!("truncation at {len} produced {other:?}"),
            }
        }
    }

    #[test]
    fn long_constants_occupy_two_pool_slots() {
        // Handcrafted pool: [1] Long (slots 1+2), [3] "main", [4] descriptor.
        let mut bytes = Vec::new();
        sample::push_u4(&mut bytes, 0xCAFE_BABE);
        sample::push_u2(&mut bytes, 0);
        sample::push_u2(&mut bytes, 52);
        sample::push_u2(&mut bytes, 5); // constant_pool_count
        bytes.push(5); // CONSTANT_Long
        sample::push_u4(&mut bytes, 0);
        sample::push_u4(&mut bytes, 42);
        bytes.push(1);
        sample::push_u2(&mut bytes, 4);
        bytes.extend_from_slice(b"main");
        bytes.push(1);
        sample::push_u2(&mut bytes, MAIN_DESCRIPTOR.len() as u16);
        bytes.extend_from_slice(MAIN_DESCRIPTOR.as_bytes());

        sample::push_u2(&mut bytes, 0x0021); // access_flags
        sample::push_u2(&mut bytes, 0); // this_class (unused by the inspector)
        sample::push_u2(&mut bytes, 0); // super_class
        sample::push_u2(&mut bytes, 0); // interfaces
        sample::push_u2(&mut bytes, 0); // fields
        sample::push_u2(&mut bytes, 1); // methods
        sample::push_u2(&mut bytes, PUBLIC_STATIC);
        sample::push_u2(&mut bytes, 3); // name index, after the two Long slots
        sample::push_u2(&mut bytes, 4); // descriptor index
        sample::push_u2(&mut bytes, 0); // attributes

        assert!(has_main_method(&bytes).unwrap());
    }

    #[test]
    fn unknown_constant_tag_is_rejected() {
        let mut bytes = Vec::new();
        sample::push_u4(&mut bytes, 0xCAFE_BABE);
        sample::push_u2(&mut bytes, 0);
        sample::push_u2(&mut bytes, 52);
        sample::push_u2(&mut bytes, 2);
        bytes.push(99);
        assert!(matches!(
            has_main_method(&bytes),
            Err(ClassParseError::UnsupportedConstant { tag: 99 })
        ));
    }
}
