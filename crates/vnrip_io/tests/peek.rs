use pretty_assertions::assert_eq;
use tracing_test::traced_test;
use vnrip_io::{ByteStream, Error, Result};

#[traced_test]
#[test]
fn peek_restores_cursor_after_success() -> Result<()> {
    let mut stream = ByteStream::from(b"\x01\x02\x03\x04hello\0".to_vec());
    stream.skip(2)?;

    let value = stream.peek(4, |s| s.read_to_zero())?;

    assert_eq!(value, b"hello");
    assert_eq!(stream.tell(), 2);
    assert_eq!(stream.read_u16_le()?, 0x0403);

    Ok(())
}

#[traced_test]
#[test]
fn peek_restores_cursor_after_failure() {
    let mut stream = ByteStream::zeroed(8);
    stream.skip(3).unwrap();

    let result: Result<u64> = stream.peek(6, |s| s.read_u64_le());

    assert!(matches!(
        result,
        Err(Error::OutOfBounds {
            offset: 6,
            requested: 8,
            size: 8
        })
    ));
    assert_eq!(stream.tell(), 3);
}

#[traced_test]
#[test]
fn peek_to_invalid_offset_fails() {
    let mut stream = ByteStream::zeroed(4);
    stream.skip(1).unwrap();

    let result: Result<u8> = stream.peek(16, |s| s.read_u8());

    assert!(result.is_err());
    assert_eq!(stream.tell(), 1);
}

#[traced_test]
#[test]
fn peek_propagates_callback_errors() {
    #[derive(Debug, PartialEq)]
    enum CallerError {
        Stream(Error),
        Rejected(u32),
    }

    impl From<Error> for CallerError {
        fn from(value: Error) -> Self {
            CallerError::Stream(value)
        }
    }

    let mut stream = ByteStream::from(vec![0x07, 0x00, 0x00, 0x00]);
    let result: std::result::Result<(), CallerError> = stream.peek(0, |s| {
        let value = s.read_u32_le()?;
        Err(CallerError::Rejected(value))
    });

    assert_eq!(result, Err(CallerError::Rejected(7)));
    assert_eq!(stream.tell(), 0);
}

#[traced_test]
#[test]
fn nested_peeks_unwind_in_order() -> Result<()> {
    let mut stream = ByteStream::from(b"ab\0cd\0ef\0".to_vec());

    let (outer, inner) = stream.peek(3, |s| {
        let inner = s.peek(6, |s| s.read_to_zero())?;
        assert_eq!(s.tell(), 3);
        Ok::<_, Error>((s.read_to_zero()?, inner))
    })?;

    assert_eq!(outer, b"cd");
    assert_eq!(inner, b"ef");
    assert_eq!(stream.tell(), 0);

    Ok(())
}
