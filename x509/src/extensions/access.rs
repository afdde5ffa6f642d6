use asn1::{SchemaBuilder, SchemaError, Type, field};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.2.2.1

AuthorityInfoAccessSyntax  ::=
        SEQUENCE SIZE (1..MAX) OF AccessDescription

AccessDescription  ::=  SEQUENCE {
        accessMethod          OBJECT IDENTIFIER,
        accessLocation        GeneralName  }

SubjectInfoAccessSyntax  ::=
        SEQUENCE SIZE (1..MAX) OF AccessDescription
 */

pub(super) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let description = b.declare("AccessDescription");
    let general_name = b.declare("GeneralName");

    b.define("AuthorityInfoAccessSyntax", Type::sequence_of(Type::reference(description)))?;
    b.define("SubjectInfoAccessSyntax", Type::sequence_of(Type::reference(description)))?;
    b.define(
        "AccessDescription",
        Type::sequence([
            field("accessMethod", Type::object_identifier()),
            field("accessLocation", Type::reference(general_name)),
        ]),
    )?;
    Ok(())
}
