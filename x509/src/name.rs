use asn1::{SchemaBuilder, SchemaError, StringKind, Type, field};

/*
https://datatracker.ietf.org/doc/html/rfc5280#section-4.1.2.4

Name ::= CHOICE { -- only one possibility for now --
  rdnSequence  RDNSequence }

RDNSequence ::= SEQUENCE OF RelativeDistinguishedName

RelativeDistinguishedName ::=
  SET SIZE (1..MAX) OF AttributeTypeAndValue

AttributeTypeAndValue ::= SEQUENCE {
  type     AttributeType,
  value    AttributeValue }

AttributeType ::= OBJECT IDENTIFIER

AttributeValue ::= ANY -- DEFINED BY AttributeType
 */

pub(crate) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let rdn_sequence = b.declare("RDNSequence");
    let rdn = b.declare("RelativeDistinguishedName");
    let atv = b.declare("AttributeTypeAndValue");
    let attribute_type = b.declare("AttributeType");
    let attribute_value = b.declare("AttributeValue");

    b.define("Name", Type::choice([("rdnSequence", Type::reference(rdn_sequence))]))?;
    b.define("RDNSequence", Type::sequence_of(Type::reference(rdn)))?;
    b.define("RelativeDistinguishedName", Type::set_of(Type::reference(atv)))?;
    b.define(
        "AttributeTypeAndValue",
        Type::sequence([
            field("type", Type::reference(attribute_type)),
            field("value", Type::reference(attribute_value)),
        ]),
    )?;
    b.define(
        "Attribute",
        Type::sequence([
            field("type", Type::reference(attribute_type)),
            field("values", Type::set_of(Type::reference(attribute_value))),
        ]),
    )?;
    b.define("AttributeType", Type::object_identifier())?;
    b.define("AttributeValue", Type::any())?;

    b.define(
        "DirectoryString",
        Type::choice([
            ("teletexString", Type::string(StringKind::Teletex)),
            ("printableString", Type::printable_string()),
            ("universalString", Type::string(StringKind::Universal)),
            ("utf8String", Type::utf8_string()),
            ("bmpString", Type::string(StringKind::Bmp)),
        ]),
    )?;

    define_general_name(b)
}

/*
GeneralNames ::= SEQUENCE SIZE (1..MAX) OF GeneralName

GeneralName ::= CHOICE {
     otherName                       [0]     OtherName,
     rfc822Name                      [1]     IA5String,
     dNSName                         [2]     IA5String,
     x400Address                     [3]     ORAddress,
     directoryName                   [4]     Name,
     ediPartyName                    [5]     EDIPartyName,
     uniformResourceIdentifier       [6]     IA5String,
     iPAddress                       [7]     OCTET STRING,
     registeredID                    [8]     OBJECT IDENTIFIER }

OtherName ::= SEQUENCE {
     type-id    OBJECT IDENTIFIER,
     value      [0] EXPLICIT ANY DEFINED BY type-id }

EDIPartyName ::= SEQUENCE {
     nameAssigner            [0]     DirectoryString OPTIONAL,
     partyName               [1]     DirectoryString }

The module uses IMPLICIT tags, which X.680 turns into EXPLICIT tags for the
CHOICE types Name and DirectoryString.
 */

fn define_general_name(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let general_name = b.declare("GeneralName");
    let another_name = b.declare("AnotherName");
    let or_address = b.declare("ORAddress");
    let name = b.declare("Name");
    let edi_party_name = b.declare("EDIPartyName");
    let directory_string = b.declare("DirectoryString");

    b.define(
        "GeneralName",
        Type::choice([
            ("otherName", Type::reference(another_name).implicit(0)),
            ("rfc822Name", Type::ia5_string().implicit(1)),
            ("dNSName", Type::ia5_string().implicit(2)),
            ("x400Address", Type::reference(or_address).implicit(3)),
            ("directoryName", Type::reference(name).explicit(4)),
            ("ediPartyName", Type::reference(edi_party_name).implicit(5)),
            ("uniformResourceIdentifier", Type::ia5_string().implicit(6)),
            ("iPAddress", Type::octet_string().implicit(7)),
            ("registeredID", Type::object_identifier().implicit(8)),
        ]),
    )?;
    b.define("GeneralNames", Type::sequence_of(Type::reference(general_name)))?;
    b.define(
        "AnotherName",
        Type::sequence([
            field("type-id", Type::object_identifier()),
            field("value", Type::any().explicit(0)),
        ]),
    )?;
    b.define(
        "EDIPartyName",
        Type::sequence([
            field("nameAssigner", Type::reference(directory_string).explicit(0)).optional(),
            field("partyName", Type::reference(directory_string).explicit(1)),
        ]),
    )?;
    Ok(())
}
