//! The X.400 address form of GeneralName.

use asn1::{SchemaBuilder, SchemaError, StringKind, TagClass, Tagging, Type, field};

/*
https://datatracker.ietf.org/doc/html/rfc5280#appendix-A.1

ORAddress ::= SEQUENCE {
   built-in-standard-attributes BuiltInStandardAttributes,
   built-in-domain-defined-attributes
                   BuiltInDomainDefinedAttributes OPTIONAL,
   extension-attributes ExtensionAttributes OPTIONAL }

BuiltInStandardAttributes ::= SEQUENCE {
   country-name                  CountryName OPTIONAL,
   administration-domain-name    AdministrationDomainName OPTIONAL,
   network-address           [0] IMPLICIT NetworkAddress OPTIONAL,
   terminal-identifier       [1] IMPLICIT TerminalIdentifier OPTIONAL,
   private-domain-name       [2] PrivateDomainName OPTIONAL,
   organization-name         [3] IMPLICIT OrganizationName OPTIONAL,
   numeric-user-identifier   [4] IMPLICIT NumericUserIdentifier OPTIONAL,
   personal-name             [5] IMPLICIT PersonalName OPTIONAL,
   organizational-unit-names [6] IMPLICIT OrganizationalUnitNames OPTIONAL }
 */

pub(crate) fn define(b: &mut SchemaBuilder) -> Result<(), SchemaError> {
    let standard = b.declare("BuiltInStandardAttributes");
    let domain_defined = b.declare("BuiltInDomainDefinedAttributes");
    let domain_defined_item = b.declare("BuiltInDomainDefinedAttribute");
    let extension_attributes = b.declare("ExtensionAttributes");
    let extension_attribute = b.declare("ExtensionAttribute");
    let country_name = b.declare("CountryName");
    let administration_domain_name = b.declare("AdministrationDomainName");
    let network_address = b.declare("NetworkAddress");
    let x121_address = b.declare("X121Address");
    let terminal_identifier = b.declare("TerminalIdentifier");
    let private_domain_name = b.declare("PrivateDomainName");
    let organization_name = b.declare("OrganizationName");
    let numeric_user_identifier = b.declare("NumericUserIdentifier");
    let personal_name = b.declare("PersonalName");
    let unit_names = b.declare("OrganizationalUnitNames");
    let unit_name = b.declare("OrganizationalUnitName");

    b.define(
        "ORAddress",
        Type::sequence([
            field("builtInStandardAttributes", Type::reference(standard)),
            field("builtInDomainDefinedAttributes", Type::reference(domain_defined)).optional(),
            field("extensionAttributes", Type::reference(extension_attributes)).optional(),
        ]),
    )?;
    b.define(
        "BuiltInStandardAttributes",
        Type::sequence([
            field("countryName", Type::reference(country_name)).optional(),
            field(
                "administrationDomainName",
                Type::reference(administration_domain_name),
            )
            .optional(),
            field("networkAddress", Type::reference(network_address).implicit(0)).optional(),
            field("terminalIdentifier", Type::reference(terminal_identifier).implicit(1)).optional(),
            field("privateDomainName", Type::reference(private_domain_name).explicit(2)).optional(),
            field("organizationName", Type::reference(organization_name).implicit(3)).optional(),
            field(
                "numericUserIdentifier",
                Type::reference(numeric_user_identifier).implicit(4),
            )
            .optional(),
            field("personalName", Type::reference(personal_name).implicit(5)).optional(),
            field("organizationalUnitNames", Type::reference(unit_names).implicit(6)).optional(),
        ]),
    )?;

    // CountryName ::= [APPLICATION 1] CHOICE { ... }
    b.define(
        "CountryName",
        Type::choice([
            ("x121DccCode", Type::string(StringKind::Numeric)),
            ("iso3166Alpha2Code", Type::printable_string()),
        ])
        .tagged(Tagging::Explicit(TagClass::Application, 1)),
    )?;
    // AdministrationDomainName ::= [APPLICATION 2] CHOICE { ... }
    b.define(
        "AdministrationDomainName",
        Type::choice([
            ("numeric", Type::string(StringKind::Numeric)),
            ("printable", Type::printable_string()),
        ])
        .tagged(Tagging::Explicit(TagClass::Application, 2)),
    )?;
    b.define("NetworkAddress", Type::reference(x121_address))?;
    b.define("X121Address", Type::string(StringKind::Numeric))?;
    b.define("TerminalIdentifier", Type::printable_string())?;
    b.define(
        "PrivateDomainName",
        Type::choice([
            ("numeric", Type::string(StringKind::Numeric)),
            ("printable", Type::printable_string()),
        ]),
    )?;
    b.define("OrganizationName", Type::printable_string())?;
    b.define("NumericUserIdentifier", Type::string(StringKind::Numeric))?;

    /*
    PersonalName ::= SET {
       surname     [0] IMPLICIT PrintableString,
       given-name  [1] IMPLICIT PrintableString OPTIONAL,
       initials    [2] IMPLICIT PrintableString OPTIONAL,
       generation-qualifier [3] IMPLICIT PrintableString OPTIONAL }
     */
    b.define(
        "PersonalName",
        Type::set([
            field("surname", Type::printable_string().implicit(0)),
            field("givenName", Type::printable_string().implicit(1)).optional(),
            field("initials", Type::printable_string().implicit(2)).optional(),
            field("generationQualifier", Type::printable_string().implicit(3)).optional(),
        ]),
    )?;
    b.define("OrganizationalUnitNames", Type::sequence_of(Type::reference(unit_name)))?;
    b.define("OrganizationalUnitName", Type::printable_string())?;

    b.define(
        "BuiltInDomainDefinedAttributes",
        Type::sequence_of(Type::reference(domain_defined_item)),
    )?;
    b.define(
        "BuiltInDomainDefinedAttribute",
        Type::sequence([
            field("type", Type::printable_string()),
            field("value", Type::printable_string()),
        ]),
    )?;

    /*
    ExtensionAttributes ::= SET SIZE (1..ub-extension-attributes) OF
                   ExtensionAttribute

    ExtensionAttribute ::=  SEQUENCE {
       extension-attribute-type [0] IMPLICIT INTEGER
                       (0..ub-extension-attributes),
       extension-attribute-value [1]
                       ANY DEFINED BY extension-attribute-type }
     */
    b.define("ExtensionAttributes", Type::set_of(Type::reference(extension_attribute)))?;
    b.define(
        "ExtensionAttribute",
        Type::sequence([
            field("extensionAttributeType", Type::integer().implicit(0)),
            field("extensionAttributeValue", Type::any().explicit(1)),
        ]),
    )?;
    Ok(())
}
